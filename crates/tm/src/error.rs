//! Hook registry error types.

use thiserror::Error;

/// Errors reported to the code registering a hook.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookError {
    /// No hook was supplied.
    #[error("no transaction hook was supplied")]
    MissingHook,

    /// Registration happened outside any transaction attempt scope.
    #[error("no transaction attempt scope is active")]
    NoActiveScope,
}

/// Convenience type alias for hook results.
pub type Result<T> = std::result::Result<T, HookError>;
