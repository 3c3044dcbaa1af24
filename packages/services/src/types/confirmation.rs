use serde::Serialize;

use super::Handle;

/// Opaque payload returned by the remote side once an operation settled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Receipt(serde_json::Value);

impl Receipt {
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmationStatus {
    Success,
    Failed,
}

/// Why a confirmation ended up [`ConfirmationStatus::Failed`]. Informational only,
/// every variant counts as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "message")]
pub enum ConfirmationFailure {
    TimedOut,
    Rejected(String),
    Lost(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmationOutcome {
    pub handle: Handle,
    pub status: ConfirmationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ConfirmationFailure>,
}

impl ConfirmationOutcome {
    pub fn succeeded(handle: Handle, receipt: Receipt) -> Self {
        Self {
            handle,
            status: ConfirmationStatus::Success,
            receipt: Some(receipt),
            failure: None,
        }
    }

    pub fn failed(handle: Handle, failure: ConfirmationFailure) -> Self {
        Self {
            handle,
            status: ConfirmationStatus::Failed,
            receipt: None,
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ConfirmationStatus::Success
    }
}
