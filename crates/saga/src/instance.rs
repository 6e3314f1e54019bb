//! State machine instances and their executed steps.

use chrono::{DateTime, Utc};
use common::InstanceId;
use serde::{Deserialize, Serialize};

use crate::state::ExecutionStatus;

/// Kind of step a state instance records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StateType {
    /// Calls a business service. The only kind that can be compensated.
    #[default]
    ServiceTask,
    ScriptTask,
    SubStateMachine,
    /// Marks the point where forward execution hands over to compensation.
    CompensationTrigger,
}

/// The error that made a state machine give up on forward execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFailure {
    /// State that raised it, if known.
    pub state_name: Option<String>,
    pub message: String,
}

impl ExecutionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            state_name: None,
            message: message.into(),
        }
    }

    pub fn in_state(state_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            state_name: Some(state_name.into()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state_name {
            Some(state) => write!(f, "{state}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// One executed step of a state machine instance.
///
/// Immutable once appended to a history, except for its compensation status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInstance {
    id: String,
    name: String,
    state_type: StateType,
    status: ExecutionStatus,
    /// Name of the step that undoes this one. `None` means not compensable.
    compensation_state: Option<String>,
    /// Id of the step this instance compensates, when it is itself a
    /// compensation step.
    compensates: Option<String>,
    /// The step may have written data even when it failed.
    for_update: bool,
    compensation_status: Option<ExecutionStatus>,
    started_at: DateTime<Utc>,
}

impl StateInstance {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        state_type: StateType,
        status: ExecutionStatus,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state_type,
            status,
            compensation_state: None,
            compensates: None,
            for_update: false,
            compensation_status: None,
            started_at: Utc::now(),
        }
    }

    /// A service step that succeeded and is undone by `compensation_state`.
    pub fn compensable(
        id: impl Into<String>,
        name: impl Into<String>,
        compensation_state: impl Into<String>,
    ) -> Self {
        Self::new(id, name, StateType::ServiceTask, ExecutionStatus::Succeed)
            .with_compensation_state(compensation_state)
    }

    pub fn with_compensation_state(mut self, compensation_state: impl Into<String>) -> Self {
        self.compensation_state = Some(compensation_state.into());
        self
    }

    pub fn compensating(mut self, original_state_id: impl Into<String>) -> Self {
        self.compensates = Some(original_state_id.into());
        self
    }

    pub fn for_update(mut self, for_update: bool) -> Self {
        self.for_update = for_update;
        self
    }

    pub fn with_status(mut self, status: ExecutionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_type(&self) -> StateType {
        self.state_type
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn compensation_state(&self) -> Option<&str> {
        self.compensation_state.as_deref()
    }

    pub fn compensates(&self) -> Option<&str> {
        self.compensates.as_deref()
    }

    pub fn is_for_update(&self) -> bool {
        self.for_update
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns true if a compensating step is defined for this one.
    pub fn is_compensable(&self) -> bool {
        self.state_type == StateType::ServiceTask && self.compensation_state.is_some()
    }

    /// Returns true if this instance is the run of a compensating step.
    pub fn is_for_compensation(&self) -> bool {
        self.compensates.is_some()
    }

    pub fn compensation_status(&self) -> Option<ExecutionStatus> {
        self.compensation_status
    }

    /// Returns true once this step's effect has been successfully undone.
    pub fn is_compensated(&self) -> bool {
        self.compensation_status == Some(ExecutionStatus::Succeed)
    }

    pub fn set_compensation_status(&mut self, status: ExecutionStatus) {
        self.compensation_status = Some(status);
    }
}

/// One run of a long-lived, multi-step process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMachineInstance {
    id: InstanceId,
    machine_name: String,
    business_key: Option<String>,
    state_list: Vec<StateInstance>,
    status: Option<ExecutionStatus>,
    compensation_status: Option<ExecutionStatus>,
    /// The failure that triggered compensation. Later errors never replace it.
    exception: Option<ExecutionFailure>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl StateMachineInstance {
    pub fn new(id: InstanceId, machine_name: impl Into<String>) -> Self {
        Self {
            id,
            machine_name: machine_name.into(),
            business_key: None,
            state_list: Vec::new(),
            status: None,
            compensation_status: None,
            exception: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn with_business_key(mut self, business_key: impl Into<String>) -> Self {
        self.business_key = Some(business_key.into());
        self
    }

    pub fn with_status(mut self, status: ExecutionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    pub fn business_key(&self) -> Option<&str> {
        self.business_key.as_deref()
    }

    /// In-memory execution history, in execution order.
    ///
    /// Empty when the instance was rebuilt without its steps, as during a
    /// recovery pass.
    pub fn state_list(&self) -> &[StateInstance] {
        &self.state_list
    }

    pub fn state_list_mut(&mut self) -> &mut Vec<StateInstance> {
        &mut self.state_list
    }

    pub fn push_state(&mut self, state: StateInstance) {
        self.state_list.push(state);
    }

    pub fn status(&self) -> Option<ExecutionStatus> {
        self.status
    }

    pub fn set_status(&mut self, status: ExecutionStatus) {
        self.status = Some(status);
    }

    pub fn compensation_status(&self) -> Option<ExecutionStatus> {
        self.compensation_status
    }

    pub fn set_compensation_status(&mut self, status: ExecutionStatus) {
        self.compensation_status = Some(status);
    }

    pub fn exception(&self) -> Option<&ExecutionFailure> {
        self.exception.as_ref()
    }

    pub fn set_exception(&mut self, exception: ExecutionFailure) {
        self.exception = Some(exception);
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn set_ended_at(&mut self, ended_at: DateTime<Utc>) {
        self.ended_at = Some(ended_at);
    }
}
