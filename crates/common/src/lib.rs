//! Types shared by every crate of the transaction core.

pub mod branch;
pub mod protocol;
pub mod types;

pub use branch::{BranchStatus, BranchType, UnknownCode};
pub use protocol::{BranchEndResponse, ResultCode, TransactionResponse};
pub use types::{BranchId, InstanceId, Xid};
