//! Resource keeper error types.

use thiserror::Error;

/// Which keeper operation found the inconsistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeeperOperation {
    Hold,
    Release,
}

impl std::fmt::Display for KeeperOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeeperOperation::Hold => write!(f, "hold"),
            KeeperOperation::Release => write!(f, "release"),
        }
    }
}

/// Errors raised by a [`ResourceKeeper`](crate::ResourceKeeper).
#[derive(Debug, Error)]
pub enum KeeperError {
    /// The keeper's bookkeeping is corrupt: a double hold, a double release,
    /// or a release by the wrong owner. Never retry this.
    #[error(
        "something wrong with keeper on {operation}: keeping [{kept}] but [{offered}] was offered with key [{key}]"
    )]
    ShouldNeverHappen {
        operation: KeeperOperation,
        key: String,
        kept: String,
        offered: String,
    },
}

impl KeeperError {
    /// Returns true for failures that indicate a bug rather than a runtime
    /// condition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, KeeperError::ShouldNeverHappen { .. })
    }
}

/// Convenience type alias for keeper results.
pub type Result<T> = std::result::Result<T, KeeperError>;
