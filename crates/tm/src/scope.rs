//! Task-local hook list for the current transaction attempt.
//!
//! Code inside [`scope`] shares one [`HookRegistry`] without passing it
//! around. The registry belongs to the scope: it is dropped when the scoped
//! future completes, panics or is dropped, so a later attempt on the same
//! worker thread never sees stale hooks.

use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;

use crate::error::{HookError, Result};
use crate::hook::{HookPoint, TransactionHook};
use crate::registry::HookRegistry;

tokio::task_local! {
    static ATTEMPT_HOOKS: RefCell<HookRegistry>;
}

/// Runs `attempt` with a fresh, empty hook list.
pub async fn scope<F: Future>(attempt: F) -> F::Output {
    ATTEMPT_HOOKS
        .scope(RefCell::new(HookRegistry::new()), attempt)
        .await
}

/// Synchronous counterpart of [`scope`].
pub fn sync_scope<R>(attempt: impl FnOnce() -> R) -> R {
    ATTEMPT_HOOKS.sync_scope(RefCell::new(HookRegistry::new()), attempt)
}

/// Returns true when called inside a [`scope`].
pub fn in_scope() -> bool {
    ATTEMPT_HOOKS.try_with(|_| ()).is_ok()
}

/// Registers `hook` for the current attempt.
pub fn register_hook(hook: Option<Arc<dyn TransactionHook>>) -> Result<()> {
    ATTEMPT_HOOKS
        .try_with(|hooks| hooks.borrow_mut().register(hook))
        .unwrap_or_else(|_| {
            tracing::warn!("transaction hook registered outside an attempt scope");
            Err(HookError::NoActiveScope)
        })
}

/// Snapshot of the current attempt's hooks. Empty outside a scope.
pub fn get_hooks() -> Vec<Arc<dyn TransactionHook>> {
    ATTEMPT_HOOKS
        .try_with(|hooks| hooks.borrow().hooks())
        .unwrap_or_default()
}

/// Detaches the current attempt's hook list. No-op outside a scope.
pub fn clear() {
    let _ = ATTEMPT_HOOKS.try_with(|hooks| hooks.borrow_mut().clear());
}

/// Invokes the current attempt's hooks for `point` in registration order.
///
/// Hooks run against a snapshot, so a hook may register further hooks
/// without affecting the current round.
pub fn trigger(point: HookPoint) {
    let hooks = get_hooks();
    tracing::debug!(%point, hooks = hooks.len(), "triggering transaction hooks");
    for hook in hooks {
        hook.on(point);
    }
}
