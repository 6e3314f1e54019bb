//! Branch transaction statuses and types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a numeric code does not name a known variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown {kind} code: {code}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: u8,
}

/// Outcome of a branch transaction, as tracked by the coordinator.
///
/// Lifecycle:
/// ```text
/// Registered ──► PhaseOneDone ──┬──► PhaseTwoCommitted
///            ├─► PhaseOneFailed  ├──► PhaseTwoCommitFailed{Retryable,Unretryable}
///            └─► PhaseOneTimeout ├──► PhaseTwoRollbacked
///                                └──► PhaseTwoRollbackFailed{Retryable,Unretryable}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BranchStatus {
    #[default]
    Unknown,
    Registered,
    PhaseOneDone,
    PhaseOneFailed,
    PhaseOneTimeout,
    PhaseTwoCommitted,
    PhaseTwoCommitFailedRetryable,
    PhaseTwoCommitFailedUnretryable,
    PhaseTwoRollbacked,
    PhaseTwoRollbackFailedRetryable,
    PhaseTwoRollbackFailedUnretryable,
}

impl BranchStatus {
    /// Stable numeric code used on the wire.
    pub fn code(&self) -> u8 {
        match self {
            BranchStatus::Unknown => 0,
            BranchStatus::Registered => 1,
            BranchStatus::PhaseOneDone => 2,
            BranchStatus::PhaseOneFailed => 3,
            BranchStatus::PhaseOneTimeout => 4,
            BranchStatus::PhaseTwoCommitted => 5,
            BranchStatus::PhaseTwoCommitFailedRetryable => 6,
            BranchStatus::PhaseTwoCommitFailedUnretryable => 7,
            BranchStatus::PhaseTwoRollbacked => 8,
            BranchStatus::PhaseTwoRollbackFailedRetryable => 9,
            BranchStatus::PhaseTwoRollbackFailedUnretryable => 10,
        }
    }

    /// Returns true once phase two has reached a final answer.
    pub fn is_phase_two_final(&self) -> bool {
        matches!(
            self,
            BranchStatus::PhaseTwoCommitted
                | BranchStatus::PhaseTwoCommitFailedUnretryable
                | BranchStatus::PhaseTwoRollbacked
                | BranchStatus::PhaseTwoRollbackFailedUnretryable
        )
    }

    /// Returns true if the coordinator should retry phase two for this branch.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BranchStatus::PhaseTwoCommitFailedRetryable
                | BranchStatus::PhaseTwoRollbackFailedRetryable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchStatus::Unknown => "Unknown",
            BranchStatus::Registered => "Registered",
            BranchStatus::PhaseOneDone => "PhaseOne_Done",
            BranchStatus::PhaseOneFailed => "PhaseOne_Failed",
            BranchStatus::PhaseOneTimeout => "PhaseOne_Timeout",
            BranchStatus::PhaseTwoCommitted => "PhaseTwo_Committed",
            BranchStatus::PhaseTwoCommitFailedRetryable => "PhaseTwo_CommitFailed_Retryable",
            BranchStatus::PhaseTwoCommitFailedUnretryable => "PhaseTwo_CommitFailed_Unretryable",
            BranchStatus::PhaseTwoRollbacked => "PhaseTwo_Rollbacked",
            BranchStatus::PhaseTwoRollbackFailedRetryable => "PhaseTwo_RollbackFailed_Retryable",
            BranchStatus::PhaseTwoRollbackFailedUnretryable => {
                "PhaseTwo_RollbackFailed_Unretryable"
            }
        }
    }
}

impl TryFrom<u8> for BranchStatus {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => BranchStatus::Unknown,
            1 => BranchStatus::Registered,
            2 => BranchStatus::PhaseOneDone,
            3 => BranchStatus::PhaseOneFailed,
            4 => BranchStatus::PhaseOneTimeout,
            5 => BranchStatus::PhaseTwoCommitted,
            6 => BranchStatus::PhaseTwoCommitFailedRetryable,
            7 => BranchStatus::PhaseTwoCommitFailedUnretryable,
            8 => BranchStatus::PhaseTwoRollbacked,
            9 => BranchStatus::PhaseTwoRollbackFailedRetryable,
            10 => BranchStatus::PhaseTwoRollbackFailedUnretryable,
            code => {
                return Err(UnknownCode {
                    kind: "branch status",
                    code,
                });
            }
        })
    }
}

impl std::fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction mode a branch participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BranchType {
    /// Automatic undo-log based mode.
    #[default]
    AT,
    /// Try / Confirm / Cancel.
    TCC,
    /// Long-running process with compensating steps.
    SAGA,
    /// XA resource manager.
    XA,
}

impl BranchType {
    pub fn code(&self) -> u8 {
        match self {
            BranchType::AT => 0,
            BranchType::TCC => 1,
            BranchType::SAGA => 2,
            BranchType::XA => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchType::AT => "AT",
            BranchType::TCC => "TCC",
            BranchType::SAGA => "SAGA",
            BranchType::XA => "XA",
        }
    }
}

impl TryFrom<u8> for BranchType {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BranchType::AT),
            1 => Ok(BranchType::TCC),
            2 => Ok(BranchType::SAGA),
            3 => Ok(BranchType::XA),
            code => Err(UnknownCode {
                kind: "branch type",
                code,
            }),
        }
    }
}

impl std::fmt::Display for BranchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
