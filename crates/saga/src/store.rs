//! Persisted state log: read side for histories, write side for finished runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::InstanceId;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::instance::{StateInstance, StateMachineInstance};

/// Durable record of state machine runs.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait StateLogStore: Send + Sync {
    /// Returns the steps of `machine_instance_id` in execution order.
    ///
    /// Must include every step durably committed before the failure that
    /// triggered compensation. Unknown ids yield an empty list.
    async fn query_state_instances(
        &self,
        machine_instance_id: InstanceId,
    ) -> Result<Vec<StateInstance>>;

    /// Persists the final shape of a finished instance.
    async fn record_state_machine_finished(&self, instance: &StateMachineInstance) -> Result<()>;
}

/// In-memory state log for testing.
#[derive(Clone, Default)]
pub struct InMemoryStateLogStore {
    states: Arc<RwLock<HashMap<InstanceId, Vec<StateInstance>>>>,
    finished: Arc<RwLock<HashMap<InstanceId, StateMachineInstance>>>,
}

impl InMemoryStateLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an executed step to an instance's history.
    pub async fn record_state(&self, machine_instance_id: InstanceId, state: StateInstance) {
        self.states
            .write()
            .await
            .entry(machine_instance_id)
            .or_default()
            .push(state);
    }

    /// Returns the last persisted shape of a finished instance.
    pub async fn finished_instance(&self, id: InstanceId) -> Option<StateMachineInstance> {
        self.finished.read().await.get(&id).cloned()
    }

    /// Returns the number of instances recorded as finished.
    pub async fn finished_count(&self) -> usize {
        self.finished.read().await.len()
    }
}

#[async_trait]
impl StateLogStore for InMemoryStateLogStore {
    async fn query_state_instances(
        &self,
        machine_instance_id: InstanceId,
    ) -> Result<Vec<StateInstance>> {
        Ok(self
            .states
            .read()
            .await
            .get(&machine_instance_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_state_machine_finished(&self, instance: &StateMachineInstance) -> Result<()> {
        self.finished
            .write()
            .await
            .insert(instance.id(), instance.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_kept_in_order() {
        let store = InMemoryStateLogStore::new();
        let id = InstanceId::new();

        store
            .record_state(id, StateInstance::compensable("s1", "Debit", "Credit"))
            .await;
        store
            .record_state(id, StateInstance::compensable("s2", "Deposit", "Withdraw"))
            .await;

        let history = store.query_state_instances(id).await.unwrap();
        let ids: Vec<&str> = history.iter().map(StateInstance::id).collect();
        assert_eq!(ids, ["s1", "s2"]);
    }

    #[tokio::test]
    async fn test_unknown_instance_has_empty_history() {
        let store = InMemoryStateLogStore::new();
        let history = store.query_state_instances(InstanceId::new()).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_record_finished() {
        let store = InMemoryStateLogStore::new();
        let inst = StateMachineInstance::new(InstanceId::new(), "transfer");

        store.record_state_machine_finished(&inst).await.unwrap();

        assert_eq!(store.finished_count().await, 1);
        let stored = store.finished_instance(inst.id()).await.unwrap();
        assert_eq!(stored.machine_name(), "transfer");
    }
}
