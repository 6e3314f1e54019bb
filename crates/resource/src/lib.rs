//! Resource-manager side bookkeeping.
//!
//! A [`ResourceKeeper`] records which local resource (a connection, an XA
//! session) is held on behalf of which branch, and treats any contradiction
//! of that record as a fatal bug. A [`BranchStatusCache`] remembers the last
//! known outcome of recent branches so phase two can short-circuit.

pub mod cache;
pub mod config;
pub mod error;
pub mod holdable;
pub mod keeper;

pub use cache::BranchStatusCache;
pub use config::KeeperConfig;
pub use error::{KeeperError, KeeperOperation, Result};
pub use holdable::{HeldFlag, Holdable};
pub use keeper::{ResourceInfo, ResourceKeeper};
