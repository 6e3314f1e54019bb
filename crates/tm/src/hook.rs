//! Lifecycle callbacks observed by the transaction manager.

/// Point in a global transaction's lifecycle at which hooks fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeBegin,
    AfterBegin,
    BeforeCommit,
    AfterCommit,
    BeforeRollback,
    AfterRollback,
    AfterCompletion,
}

impl HookPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPoint::BeforeBegin => "before_begin",
            HookPoint::AfterBegin => "after_begin",
            HookPoint::BeforeCommit => "before_commit",
            HookPoint::AfterCommit => "after_commit",
            HookPoint::BeforeRollback => "before_rollback",
            HookPoint::AfterRollback => "after_rollback",
            HookPoint::AfterCompletion => "after_completion",
        }
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Callbacks a caller can attach to one transaction attempt.
///
/// Every method defaults to doing nothing.
pub trait TransactionHook: Send + Sync {
    fn before_begin(&self) {}

    fn after_begin(&self) {}

    fn before_commit(&self) {}

    fn after_commit(&self) {}

    fn before_rollback(&self) {}

    fn after_rollback(&self) {}

    /// Runs after commit or rollback, whatever the outcome.
    fn after_completion(&self) {}

    /// Dispatches to the callback for `point`.
    fn on(&self, point: HookPoint) {
        match point {
            HookPoint::BeforeBegin => self.before_begin(),
            HookPoint::AfterBegin => self.after_begin(),
            HookPoint::BeforeCommit => self.before_commit(),
            HookPoint::AfterCommit => self.after_commit(),
            HookPoint::BeforeRollback => self.before_rollback(),
            HookPoint::AfterRollback => self.after_rollback(),
            HookPoint::AfterCompletion => self.after_completion(),
        }
    }
}
