use std::{num::NonZeroUsize, time::Duration};

use itertools::Itertools;
use serde::Serialize;

use super::{ConfirmationOutcome, Handle};

/// Splits `handles` into contiguous batches of `batch_size`; only the last one may be shorter.
pub fn batches(handles: &[Handle], batch_size: NonZeroUsize) -> std::slice::Chunks<'_, Handle> {
    handles.chunks(batch_size.get())
}

pub fn batch_count(num_handles: usize, batch_size: NonZeroUsize) -> usize {
    num_handles.div_ceil(batch_size.get())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub index: usize,
    pub size: usize,
    pub elapsed: Duration,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn new(index: usize, elapsed: Duration, outcomes: &[ConfirmationOutcome]) -> Self {
        let (succeeded, failed) = tally(outcomes);
        Self {
            index,
            size: outcomes.len(),
            elapsed,
            succeeded,
            failed,
        }
    }
}

/// Running totals over the whole confirmation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_batch(&mut self, outcomes: &[ConfirmationOutcome]) {
        let (succeeded, failed) = tally(outcomes);
        self.processed += outcomes.len();
        self.succeeded += succeeded;
        self.failed += failed;
    }

    pub fn is_complete(&self) -> bool {
        self.processed == self.total
    }
}

fn tally(outcomes: &[ConfirmationOutcome]) -> (usize, usize) {
    let succeeded = outcomes.iter().filter(|outcome| outcome.is_success()).count();
    (succeeded, outcomes.len() - succeeded)
}

/// Counts how many outcomes reference each handle. Used to spot duplicates or drops.
pub fn outcomes_per_handle(
    outcomes: &[ConfirmationOutcome],
) -> std::collections::HashMap<&Handle, usize> {
    outcomes.iter().map(|outcome| &outcome.handle).counts()
}
