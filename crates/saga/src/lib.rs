//! Saga compensation for long-running state machine processes.
//!
//! A state machine instance runs a sequence of steps. When forward execution
//! fails, or a recovery sweep picks up an unfinished instance, the
//! [`CompensationTrigger`] decides what happens next:
//! 1. Load the execution history (in memory, or from the [`StateLogStore`])
//! 2. Ask the [`CompensationPolicy`] which executed steps must be undone
//! 3. Queue them on the context's [`CompensationHolder`] so the last executed
//!    step is compensated first, or end the instance if there is nothing to undo
//!
//! Running the compensating steps themselves belongs to the state router.

pub mod context;
pub mod error;
pub mod holder;
pub mod instance;
pub mod policy;
pub mod state;
pub mod store;
pub mod terminator;
pub mod trigger;

pub use context::ProcessContext;
pub use error::{Result, SagaError};
pub use holder::CompensationHolder;
pub use instance::{ExecutionFailure, StateInstance, StateMachineInstance, StateType};
pub use policy::{CompensableStatesPolicy, CompensationPolicy};
pub use state::ExecutionStatus;
pub use store::{InMemoryStateLogStore, StateLogStore};
pub use terminator::{CompletionListener, StateMachineTerminator, Terminator};
pub use trigger::{CompensationTrigger, TriggerOutcome};
