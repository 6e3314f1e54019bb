//! Saga error types.

use common::InstanceId;
use thiserror::Error;

/// Errors that can occur while triggering compensation or finishing a run.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The state log store could not be read or written.
    #[error("State log store error: {0}")]
    Store(String),

    /// The instance was already finalized through this context.
    #[error("State machine instance {0} has already ended")]
    AlreadyEnded(InstanceId),

    /// A context variable could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
