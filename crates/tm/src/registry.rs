//! Hook list owned by one transaction attempt.

use std::sync::Arc;

use crate::error::{HookError, Result};
use crate::hook::{HookPoint, TransactionHook};

/// Ordered hooks of one transaction attempt.
///
/// The list is created on the first registration and detached again by
/// [`clear`](Self::clear). Pass a registry along with the attempt it belongs
/// to, or use the task-local [`scope`](crate::scope()) which does that for you.
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: Option<Vec<Arc<dyn TransactionHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `hook`. Fails with [`HookError::MissingHook`] when `None`.
    pub fn register(&mut self, hook: Option<Arc<dyn TransactionHook>>) -> Result<()> {
        let Some(hook) = hook else {
            tracing::warn!("rejected transaction hook registration without a hook");
            return Err(HookError::MissingHook);
        };
        self.hooks.get_or_insert_with(Vec::new).push(hook);
        Ok(())
    }

    /// Snapshot of the registered hooks, in registration order.
    pub fn hooks(&self) -> Vec<Arc<dyn TransactionHook>> {
        self.hooks.clone().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.hooks.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true while a list is attached.
    pub fn is_attached(&self) -> bool {
        self.hooks.is_some()
    }

    /// Detaches the hook list.
    pub fn clear(&mut self) {
        self.hooks = None;
    }

    /// Invokes every hook for `point` in registration order.
    pub fn trigger(&self, point: HookPoint) {
        for hook in self.hooks.iter().flatten() {
            hook.on(point);
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("attached", &self.is_attached())
            .field("hooks", &self.len())
            .finish()
    }
}
