//! Per-context stack of steps waiting to be compensated.

use std::collections::HashSet;

use crate::instance::StateInstance;

/// Steps still to be compensated for one process context.
///
/// Steps are pushed in execution order, so popping yields the most recently
/// executed step first. A step already on the stack is not pushed again,
/// which keeps repeated recovery triggers from stacking duplicates before
/// the stack drains.
#[derive(Debug, Clone, Default)]
pub struct CompensationHolder {
    stack: Vec<StateInstance>,
    queued: HashSet<String>,
}

impl CompensationHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `state` unless a step with the same id is already queued.
    /// Returns whether it was pushed.
    pub fn push(&mut self, state: StateInstance) -> bool {
        if !self.queued.insert(state.id().to_string()) {
            return false;
        }
        self.stack.push(state);
        true
    }

    /// Pushes every state in order and returns how many were new.
    pub fn push_all(&mut self, states: impl IntoIterator<Item = StateInstance>) -> usize {
        states.into_iter().map(|s| self.push(s)).filter(|&pushed| pushed).count()
    }

    pub fn pop(&mut self) -> Option<StateInstance> {
        let state = self.stack.pop()?;
        self.queued.remove(state.id());
        Some(state)
    }

    pub fn peek(&self) -> Option<&StateInstance> {
        self.stack.last()
    }

    pub fn contains(&self, state_id: &str) -> bool {
        self.queued.contains(state_id)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Queued steps in the order they will be popped.
    pub fn iter(&self) -> impl Iterator<Item = &StateInstance> {
        self.stack.iter().rev()
    }
}
