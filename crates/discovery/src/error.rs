//! Discovery error types.

use thiserror::Error;

/// Errors that can occur while selecting a node.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The resolved node list was empty.
    #[error("No available node to route to")]
    NoAvailableNode,
}

/// Convenience type alias for discovery results.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
