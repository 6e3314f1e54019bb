//! Process context: everything scoped to one in-flight state machine run.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::holder::CompensationHolder;
use crate::instance::{ExecutionFailure, StateMachineInstance};

/// Storage owned by one running state machine instance.
///
/// Nothing in here is shared between contexts. The owning process drives
/// its context from one task at a time, so there is no internal locking.
/// Dropping the context drops any pending compensation stack with it.
#[derive(Debug)]
pub struct ProcessContext {
    instance: StateMachineInstance,
    current_state: Option<String>,
    current_exception: Option<ExecutionFailure>,
    compensation_holder: Option<CompensationHolder>,
    compensation_trigger_state: Option<String>,
    variables: HashMap<String, serde_json::Value>,
    ended: bool,
}

impl ProcessContext {
    pub fn new(instance: StateMachineInstance) -> Self {
        Self {
            instance,
            current_state: None,
            current_exception: None,
            compensation_holder: None,
            compensation_trigger_state: None,
            variables: HashMap::new(),
            ended: false,
        }
    }

    pub fn instance(&self) -> &StateMachineInstance {
        &self.instance
    }

    pub fn instance_mut(&mut self) -> &mut StateMachineInstance {
        &mut self.instance
    }

    pub fn into_instance(self) -> StateMachineInstance {
        self.instance
    }

    /// Name of the state the router is currently executing.
    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    pub fn set_current_state(&mut self, state: impl Into<String>) {
        self.current_state = Some(state.into());
    }

    /// Records the error raised by forward execution.
    pub fn capture_exception(&mut self, exception: ExecutionFailure) {
        self.current_exception = Some(exception);
    }

    pub fn current_exception(&self) -> Option<&ExecutionFailure> {
        self.current_exception.as_ref()
    }

    /// Removes and returns the captured forward error.
    pub fn take_exception(&mut self) -> Option<ExecutionFailure> {
        self.current_exception.take()
    }

    pub fn compensation_holder(&self) -> Option<&CompensationHolder> {
        self.compensation_holder.as_ref()
    }

    /// The compensation stack, created on first use.
    pub fn compensation_holder_mut(&mut self) -> &mut CompensationHolder {
        self.compensation_holder.get_or_insert_with(CompensationHolder::new)
    }

    /// State the router resolves next to begin compensating.
    pub fn compensation_trigger_state(&self) -> Option<&str> {
        self.compensation_trigger_state.as_deref()
    }

    pub fn set_compensation_trigger_state(&mut self, state: Option<String>) {
        self.compensation_trigger_state = state;
    }

    /// Returns true once the instance has been finalized.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn mark_ended(&mut self) {
        self.ended = true;
    }

    pub fn set_variable<T: Serialize>(&mut self, name: impl Into<String>, value: &T) -> Result<()> {
        self.variables
            .insert(name.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Reads a variable back into `T`. Returns `Ok(None)` when unset.
    pub fn variable<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.variables
            .get(name)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(Into::into)
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<serde_json::Value> {
        self.variables.remove(name)
    }
}
