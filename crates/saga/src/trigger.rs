//! Hand-over from failed forward execution to compensation.

use crate::context::ProcessContext;
use crate::error::{Result, SagaError};
use crate::policy::CompensationPolicy;
use crate::state::ExecutionStatus;
use crate::store::StateLogStore;
use crate::terminator::Terminator;

/// What a compensation trigger decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Steps were queued and the instance is now compensating.
    Compensating {
        /// Steps newly pushed onto the compensation stack.
        queued: usize,
    },
    /// Nothing to undo: the instance was finalized instead.
    Ended,
}

/// Decides, once forward execution has failed or is being recovered,
/// whether a state machine instance starts compensating or simply ends.
///
/// The result depends only on the persisted history, the policy's answer
/// and the instance's current status fields, so re-running it after a crash
/// reaches the same decision.
pub struct CompensationTrigger<S, P, T>
where
    S: StateLogStore,
    P: CompensationPolicy,
    T: Terminator,
{
    store: S,
    policy: P,
    terminator: T,
}

impl<S, P, T> CompensationTrigger<S, P, T>
where
    S: StateLogStore,
    P: CompensationPolicy,
    T: Terminator,
{
    pub fn new(store: S, policy: P, terminator: T) -> Self {
        Self {
            store,
            policy,
            terminator,
        }
    }

    /// Starts compensation for the instance owned by `context`.
    ///
    /// When there are steps to undo they are pushed onto the context's
    /// compensation stack in execution order, the captured forward error moves
    /// onto the instance, and the compensation status becomes `Running`. A
    /// forward status that is unset or `Running` becomes `Unknown`; any other
    /// forward status was set by an earlier run and is kept for recovery.
    ///
    /// When there is nothing to undo the instance is handed to the
    /// terminator, at most once per context.
    #[tracing::instrument(skip(self, context), fields(instance_id = %context.instance().id()))]
    pub async fn trigger_compensation(&self, context: &mut ProcessContext) -> Result<TriggerOutcome> {
        let instance_id = context.instance().id();
        if context.is_ended() {
            return Err(SagaError::AlreadyEnded(instance_id));
        }

        // A recovery pass rebuilds the instance without its steps.
        let history = if context.instance().state_list().is_empty() {
            self.store.query_state_instances(instance_id).await?
        } else {
            context.instance().state_list().to_vec()
        };

        let to_compensate = self.policy.states_to_compensate(context, &history);

        if to_compensate.is_empty() {
            tracing::info!(history = history.len(), "nothing to compensate, ending state machine");
            self.terminator.end_state_machine(context).await?;
            context.mark_ended();
            metrics::counter!("saga_compensation_skipped_total").increment(1);
            return Ok(TriggerOutcome::Ended);
        }

        if let Some(exception) = context.take_exception() {
            context.instance_mut().set_exception(exception);
        }

        let queued = context.compensation_holder_mut().push_all(to_compensate);

        let instance = context.instance_mut();
        if matches!(instance.status(), None | Some(ExecutionStatus::Running)) {
            instance.set_status(ExecutionStatus::Unknown);
        }
        instance.set_compensation_status(ExecutionStatus::Running);

        let trigger_state = context.current_state().map(str::to_string);
        context.set_compensation_trigger_state(trigger_state);

        metrics::counter!("saga_compensation_triggered_total").increment(1);
        tracing::warn!(
            queued,
            status = ?context.instance().status(),
            "compensation triggered"
        );

        Ok(TriggerOutcome::Compensating { queued })
    }
}
