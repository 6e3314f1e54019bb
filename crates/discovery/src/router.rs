//! Consistent-hash selection of a coordinator node.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::config::RouterConfig;
use crate::error::{DiscoveryError, Result};
use crate::hash::{DigestHash, HashFunction};

/// Picks one node out of a resolved node list for a transaction id.
pub trait LoadBalance: Send + Sync {
    /// Selects the node responsible for `xid`.
    ///
    /// Fails with [`DiscoveryError::NoAvailableNode`] when `nodes` is empty.
    fn select<'a, T: Display>(&self, nodes: &'a [T], xid: &str) -> Result<&'a T>;
}

/// A hash ring built from one snapshot of the node list.
///
/// Each node occupies `virtual_nodes` positions, hashed from the node's
/// display form followed by the replica index. Colliding positions keep the
/// node inserted last.
#[derive(Debug)]
pub struct HashRing<'a, T, H = DigestHash> {
    ring: BTreeMap<u32, &'a T>,
    hasher: H,
}

impl<'a, T: Display> HashRing<'a, T, DigestHash> {
    pub fn new(nodes: &'a [T], virtual_nodes: usize) -> Result<Self> {
        Self::with_hasher(nodes, virtual_nodes, DigestHash)
    }
}

impl<'a, T: Display, H: HashFunction> HashRing<'a, T, H> {
    pub fn with_hasher(nodes: &'a [T], virtual_nodes: usize, hasher: H) -> Result<Self> {
        if nodes.is_empty() {
            return Err(DiscoveryError::NoAvailableNode);
        }

        let mut ring = BTreeMap::new();
        for node in nodes {
            let identity = node.to_string();
            for replica in 0..virtual_nodes.max(1) {
                ring.insert(hasher.hash(&format!("{identity}{replica}")), node);
            }
        }

        Ok(Self { ring, hasher })
    }

    /// Resolves `key` to the first ring position at or after its hash,
    /// wrapping to the lowest position past the end of the ring.
    ///
    /// Returns `None` only for an empty ring, which construction rules out.
    pub fn select(&self, key: &str) -> Option<&'a T> {
        let hash = self.hasher.hash(key);
        self.ring
            .range(hash..)
            .next()
            .or_else(|| self.ring.first_key_value())
            .map(|(_, node)| *node)
    }

    /// Number of occupied ring positions.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

/// Sticky router: the same transaction id lands on the same node for as
/// long as the node list doesn't change.
///
/// Every [`select`](LoadBalance::select) call builds its own ring from the
/// list it is given, so concurrent callers holding different snapshots never
/// share mutable state.
#[derive(Debug, Clone)]
pub struct ConsistentHashRouter<H = DigestHash> {
    virtual_nodes: usize,
    hasher: H,
}

impl ConsistentHashRouter<DigestHash> {
    pub fn new(config: RouterConfig) -> Self {
        Self::with_hasher(config, DigestHash)
    }

    /// Builds a router configured from the process environment.
    pub fn from_env() -> Self {
        Self::new(RouterConfig::from_env())
    }
}

impl Default for ConsistentHashRouter<DigestHash> {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl<H: HashFunction + Clone> ConsistentHashRouter<H> {
    pub fn with_hasher(config: RouterConfig, hasher: H) -> Self {
        tracing::debug!(virtual_nodes = config.virtual_nodes, "consistent hash router built");
        Self {
            virtual_nodes: config.virtual_nodes.max(1),
            hasher,
        }
    }

    pub fn virtual_nodes(&self) -> usize {
        self.virtual_nodes
    }

    /// Builds a reusable ring over `nodes`.
    pub fn ring<'a, T: Display>(&self, nodes: &'a [T]) -> Result<HashRing<'a, T, H>> {
        HashRing::with_hasher(nodes, self.virtual_nodes, self.hasher.clone())
    }
}

impl<H: HashFunction + Clone> LoadBalance for ConsistentHashRouter<H> {
    fn select<'a, T: Display>(&self, nodes: &'a [T], xid: &str) -> Result<&'a T> {
        self.ring(nodes)
            .ok()
            .and_then(|ring| ring.select(xid))
            .ok_or_else(|| {
                metrics::counter!("discovery_no_available_node_total").increment(1);
                tracing::warn!(%xid, "no coordinator node available");
                DiscoveryError::NoAvailableNode
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Places every key and replica by its trailing number so ring order is
    /// predictable.
    #[derive(Clone)]
    struct NumericHash;

    impl HashFunction for NumericHash {
        fn hash(&self, key: &str) -> u32 {
            key.parse().unwrap_or(0)
        }
    }

    #[test]
    fn test_empty_node_list_is_rejected() {
        let router = ConsistentHashRouter::default();
        let nodes: Vec<String> = Vec::new();
        assert!(matches!(
            router.select(&nodes, "xid-1"),
            Err(DiscoveryError::NoAvailableNode)
        ));
    }

    #[test]
    fn test_ring_has_one_position_per_replica() {
        let nodes = ["a", "b", "c"];
        let ring = HashRing::new(&nodes, 8).unwrap();
        assert_eq!(ring.len(), 24);
    }

    #[test]
    fn test_ceiling_and_wrap_around() {
        // Node "1" replicas land on 10 and 11, node "5" on 50 and 51.
        let nodes = ["1", "5"];
        let ring = HashRing::with_hasher(&nodes, 2, NumericHash).unwrap();

        assert_eq!(*ring.select("0").unwrap(), "1");
        assert_eq!(*ring.select("11").unwrap(), "1");
        assert_eq!(*ring.select("12").unwrap(), "5");
        assert_eq!(*ring.select("51").unwrap(), "5");
        // Past the highest position wraps to the lowest.
        assert_eq!(*ring.select("52").unwrap(), "1");
    }

    #[test]
    fn test_collision_keeps_last_inserted_node() {
        // Two nodes with the same identity collide on every replica.
        let nodes = ["1", "1"];
        let ring = HashRing::with_hasher(&nodes, 1, NumericHash).unwrap();
        assert_eq!(ring.len(), 1);
        assert!(std::ptr::eq(ring.select("0").unwrap(), &nodes[1]));
    }

    #[test]
    fn test_single_node_always_selected() {
        let router = ConsistentHashRouter::default();
        let nodes = ["only:8091"];
        for i in 0..100 {
            assert_eq!(*router.select(&nodes, &format!("xid-{i}")).unwrap(), "only:8091");
        }
    }
}
