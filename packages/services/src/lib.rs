pub mod batch_confirmer;
pub mod orchestrator;
pub mod submitter;
pub mod types;

pub use batch_confirmer::{Config as BatchConfirmerConfig, service::BatchConfirmer};
pub use orchestrator::{RunReport, submit_and_confirm};
pub use submitter::service::Submitter;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Submission error: {0}")]
    Submission(String),
    #[error("Confirmation error: {0}")]
    Confirmation(String),
    #[error("Batch aggregation error: {0}")]
    BatchAggregation(String),
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::BatchAggregation(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
