//! Finalization of a state machine run.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::context::ProcessContext;
use crate::error::Result;
use crate::instance::StateMachineInstance;
use crate::state::ExecutionStatus;
use crate::store::StateLogStore;

/// Finalizes a run: settles its status, persists it and tells observers.
#[async_trait]
pub trait Terminator: Send + Sync {
    async fn end_state_machine(&self, context: &mut ProcessContext) -> Result<()>;
}

/// Observer notified once a run has been finalized.
pub trait CompletionListener: Send + Sync {
    fn on_finished(&self, instance: &StateMachineInstance);
}

/// Default [`Terminator`] backed by a [`StateLogStore`].
///
/// An unset or running forward status settles to `Failed` when the instance
/// carries an exception, `Succeed` otherwise. Any other status is left as
/// it is.
pub struct StateMachineTerminator<S: StateLogStore> {
    store: S,
    listeners: Vec<Arc<dyn CompletionListener>>,
}

impl<S: StateLogStore> StateMachineTerminator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            listeners: Vec::new(),
        }
    }

    /// Registers an observer for finished runs.
    pub fn register(&mut self, listener: Arc<dyn CompletionListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[async_trait]
impl<S: StateLogStore> Terminator for StateMachineTerminator<S> {
    #[tracing::instrument(skip(self, context), fields(instance_id = %context.instance().id()))]
    async fn end_state_machine(&self, context: &mut ProcessContext) -> Result<()> {
        let instance = context.instance_mut();
        instance.set_ended_at(Utc::now());

        if matches!(instance.status(), None | Some(ExecutionStatus::Running)) {
            let settled = if instance.exception().is_some() {
                ExecutionStatus::Failed
            } else {
                ExecutionStatus::Succeed
            };
            instance.set_status(settled);
        }

        self.store.record_state_machine_finished(instance).await?;

        for listener in &self.listeners {
            listener.on_finished(instance);
        }

        metrics::counter!("saga_state_machine_ended_total").increment(1);
        tracing::info!(status = ?instance.status(), "state machine ended");
        Ok(())
    }
}
