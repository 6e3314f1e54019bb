//! Transaction-manager lifecycle hooks.
//!
//! Hooks observe one transaction attempt. Callers either own a
//! [`HookRegistry`] for the attempt and pass it along, or run the attempt
//! inside [`scope()`] and use the free functions, which act on a task-local
//! registry that disappears with the attempt.

pub mod error;
pub mod hook;
pub mod registry;
pub mod scope;

pub use error::{HookError, Result};
pub use hook::{HookPoint, TransactionHook};
pub use registry::HookRegistry;
pub use scope::{clear, get_hooks, in_scope, register_hook, scope, sync_scope, trigger};
