//! Selection of the steps that compensation has to undo.

use crate::context::ProcessContext;
use crate::instance::StateInstance;
use crate::state::ExecutionStatus;

/// Decides which executed steps need compensating.
///
/// Treated as a pure function: same history and context, same answer.
/// The result must keep history order.
pub trait CompensationPolicy: Send + Sync {
    fn states_to_compensate(
        &self,
        context: &ProcessContext,
        history: &[StateInstance],
    ) -> Vec<StateInstance>;
}

/// Selects every compensable step that has not been undone yet.
///
/// A failed step is skipped unless it is marked for update, since a failed
/// read left nothing behind but a failed write may have.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompensableStatesPolicy;

impl CompensableStatesPolicy {
    pub fn needs_compensation(state: &StateInstance) -> bool {
        state.is_compensable()
            && !state.is_for_compensation()
            && !state.is_compensated()
            && (state.status() != ExecutionStatus::Failed || state.is_for_update())
    }
}

impl CompensationPolicy for CompensableStatesPolicy {
    fn states_to_compensate(
        &self,
        _context: &ProcessContext,
        history: &[StateInstance],
    ) -> Vec<StateInstance> {
        history
            .iter()
            .filter(|s| Self::needs_compensation(s))
            .cloned()
            .collect()
    }
}
