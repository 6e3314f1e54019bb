//! Routing of transaction ids to coordinator nodes.
//!
//! A [`ConsistentHashRouter`] places every node on a 32-bit hash ring at
//! several virtual positions and resolves a transaction id to the first node
//! clockwise from the id's own hash. With a stable node list, retries for the
//! same transaction keep landing on the same coordinator, and adding a node
//! only moves the keys that now fall in front of it.

pub mod config;
pub mod error;
pub mod hash;
pub mod router;

pub use config::{RouterConfig, VIRTUAL_NODES_DEFAULT, VIRTUAL_NODES_ENV};
pub use error::{DiscoveryError, Result};
pub use hash::{DigestHash, HashFunction};
pub use router::{ConsistentHashRouter, HashRing, LoadBalance};
