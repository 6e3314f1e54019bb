use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id of one state machine run.
///
/// Assigned when the run starts and kept across recovery sweeps, so the
/// state log can be queried by it after a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// Fresh id for a run that is about to start.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Parses an id read back from the state log.
impl std::str::FromStr for InstanceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for InstanceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<InstanceId> for Uuid {
    fn from(id: InstanceId) -> Self {
        id.0
    }
}

/// Global transaction id, as issued by the coordinator.
///
/// Also the routing key used to pick a coordinator node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Xid(String);

impl Xid {
    pub fn new(xid: impl Into<String>) -> Self {
        Self(xid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Xid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Xid {
    fn from(xid: &str) -> Self {
        Self(xid.to_string())
    }
}

impl From<String> for Xid {
    fn from(xid: String) -> Self {
        Self(xid)
    }
}

impl AsRef<str> for Xid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Branch transaction id, unique within a global transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(i64);

impl BranchId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BranchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BranchId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_id_new_creates_unique_ids() {
        let id1 = InstanceId::new();
        let id2 = InstanceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn instance_id_parses_back_from_log_text() {
        let id = InstanceId::new();
        let parsed: InstanceId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(Uuid::from(parsed), Uuid::from(id));
        assert!("not-an-id".parse::<InstanceId>().is_err());
    }

    #[test]
    fn xid_serializes_as_plain_string() {
        let xid = Xid::new("192.168.0.1:8091:2001");
        let json = serde_json::to_string(&xid).unwrap();
        assert_eq!(json, "\"192.168.0.1:8091:2001\"");
        assert_eq!(xid.to_string(), "192.168.0.1:8091:2001");
    }

    #[test]
    fn branch_id_is_transparent_i64() {
        let id = BranchId::from(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(id.value(), 42);
    }
}
