use serde::Serialize;
use tracing::info;

use crate::{
    BatchConfirmer, Submitter,
    batch_confirmer::{self, service::ConfirmationRun},
    submitter,
    types::{BatchReport, ConfirmationOutcome, Progress, SubmissionOutcome, submitted_handles},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub submissions: Vec<SubmissionOutcome>,
    pub confirmations: Vec<ConfirmationOutcome>,
    pub batches: Vec<BatchReport>,
    pub progress: Progress,
}

impl RunReport {
    pub fn submitted(&self) -> usize {
        self.submissions
            .iter()
            .filter(|outcome| outcome.handle().is_some())
            .count()
    }
}

/// Submits `count` operations and then confirms every one that got a handle.
pub async fn submit_and_confirm<S, C>(
    submitter: &Submitter<S>,
    confirmer: &BatchConfirmer<C>,
    count: usize,
) -> RunReport
where
    S: submitter::port::Api,
    C: batch_confirmer::port::Api + Send + Sync + 'static,
{
    let submissions = submitter.submit_all(count).await;
    let handles = submitted_handles(&submissions);

    info!(
        "{} of {count} submissions accepted, confirming in batches",
        handles.len()
    );

    let ConfirmationRun {
        outcomes,
        reports,
        progress,
    } = confirmer.confirm_all(handles).await;

    RunReport {
        submissions,
        confirmations: outcomes,
        batches: reports,
        progress,
    }
}
