//! Response envelopes exchanged between resource managers and the coordinator.
//!
//! Only field presence and types are fixed here. Framing and codecs belong
//! to the transport.

use serde::{Deserialize, Serialize};

use crate::branch::BranchStatus;
use crate::types::{BranchId, Xid};

/// Outcome flag carried by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResultCode {
    Failed,
    #[default]
    Success,
}

impl ResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::Failed => "Failed",
            ResultCode::Success => "Success",
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generic response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub result_code: ResultCode,
    pub msg: Option<String>,
}

impl TransactionResponse {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            result_code: ResultCode::Failed,
            msg: Some(msg.into()),
        }
    }
}

/// Response to a branch commit or rollback request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchEndResponse {
    #[serde(flatten)]
    pub response: TransactionResponse,
    pub xid: Xid,
    pub branch_id: BranchId,
    pub branch_status: BranchStatus,
}

impl BranchEndResponse {
    /// A successful response reporting `branch_status`.
    pub fn new(xid: Xid, branch_id: BranchId, branch_status: BranchStatus) -> Self {
        Self {
            response: TransactionResponse::success(),
            xid,
            branch_id,
            branch_status,
        }
    }

    /// A failed response. The branch status still reports what the resource
    /// manager knows.
    pub fn failed(
        xid: Xid,
        branch_id: BranchId,
        branch_status: BranchStatus,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            response: TransactionResponse::failed(msg),
            xid,
            branch_id,
            branch_status,
        }
    }

    pub fn result_code(&self) -> ResultCode {
        self.response.result_code
    }

    pub fn msg(&self) -> Option<&str> {
        self.response.msg.as_deref()
    }
}

impl std::fmt::Display for BranchEndResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BranchEndResponse{{xid='{}', branchId={}, branchStatus={}, resultCode={}, msg='{}'}}",
            self.xid,
            self.branch_id,
            self.branch_status,
            self.response.result_code,
            self.msg().unwrap_or("null"),
        )
    }
}
