use serde::{Deserialize, Serialize};

use super::Handle;

/// Description of a single operation to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub destination: String,
    pub value: u128,
    pub data: String,
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum SubmissionResult {
    Submitted { handle: Handle },
    Failed { error: String },
}

/// Result of one submission attempt, keyed by its position in the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub index: usize,
    #[serde(flatten)]
    pub result: SubmissionResult,
}

impl SubmissionOutcome {
    pub fn submitted(index: usize, handle: Handle) -> Self {
        Self {
            index,
            result: SubmissionResult::Submitted { handle },
        }
    }

    pub fn failed(index: usize, error: impl Into<String>) -> Self {
        Self {
            index,
            result: SubmissionResult::Failed {
                error: error.into(),
            },
        }
    }

    pub fn handle(&self) -> Option<&Handle> {
        match &self.result {
            SubmissionResult::Submitted { handle } => Some(handle),
            SubmissionResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.result {
            SubmissionResult::Submitted { .. } => None,
            SubmissionResult::Failed { error } => Some(error),
        }
    }
}

/// Handles of the successful submissions, in submission order.
pub fn submitted_handles<'a>(
    outcomes: impl IntoIterator<Item = &'a SubmissionOutcome>,
) -> Vec<Handle> {
    outcomes
        .into_iter()
        .filter_map(SubmissionOutcome::handle)
        .cloned()
        .collect()
}
