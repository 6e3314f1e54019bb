//! Execution status of state machines and their steps.

use serde::{Deserialize, Serialize};

/// Execution status shared by state machine instances and state instances.
///
/// Forward status of a state machine instance:
/// ```text
/// (unset) ──► Running ──┬──► Succeed
///    │                  ├──► Failed
///    └──────────────────┴──► Unknown ──► (settled after compensation)
/// ```
/// Compensation status moves `(unset) ──► Running ──► Succeed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Still executing.
    Running,

    /// Finished successfully (terminal state).
    Succeed,

    /// Finished with a failure (terminal state).
    Failed,

    /// Outcome not known: the forward path was abandoned for compensation,
    /// or a step's effect could not be confirmed.
    Unknown,
}

impl ExecutionStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Succeed | ExecutionStatus::Failed)
    }

    /// Two-letter code used in persisted state logs.
    pub fn code(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "RU",
            ExecutionStatus::Succeed => "SU",
            ExecutionStatus::Failed => "FA",
            ExecutionStatus::Unknown => "UN",
        }
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "Running",
            ExecutionStatus::Succeed => "Succeed",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
