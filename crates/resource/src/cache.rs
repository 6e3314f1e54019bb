//! Bounded, idle-expiring cache of last known branch statuses.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use common::BranchStatus;
use lru::LruCache;
use parking_lot::Mutex;

use crate::config::KeeperConfig;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    status: BranchStatus,
    last_access: Instant,
}

/// Advisory cache of branch outcomes, keyed by branch id.
///
/// Holds at most `cache_size` entries, evicting the least recently accessed
/// one when full. An entry not read or written for `idle_timeout` is gone
/// regardless of capacity. Expiry is checked lazily on access, so readers
/// never wait on a sweep.
///
/// Never the system of record: a miss is normal.
#[derive(Debug)]
pub struct BranchStatusCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    idle_timeout: Duration,
}

impl BranchStatusCache {
    pub fn new(config: KeeperConfig) -> Self {
        Self::with_capacity(config.cache_size, config.idle_timeout)
    }

    pub fn with_capacity(capacity: NonZeroUsize, idle_timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            idle_timeout,
        }
    }

    pub fn put(&self, branch_id: &str, status: BranchStatus) {
        let entry = CacheEntry {
            status,
            last_access: Instant::now(),
        };
        self.entries.lock().put(branch_id.to_string(), entry);
    }

    pub fn get(&self, branch_id: &str) -> Option<BranchStatus> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let status = match entries.get_mut(branch_id) {
            Some(entry) if now.duration_since(entry.last_access) < self.idle_timeout => {
                entry.last_access = now;
                Some(entry.status)
            }
            _ => None,
        };
        if status.is_none() {
            entries.pop(branch_id);
        }
        drop(entries);

        if status.is_some() {
            metrics::counter!("branch_status_cache_hit_total").increment(1);
        } else {
            metrics::counter!("branch_status_cache_miss_total").increment(1);
        }
        status
    }

    pub fn invalidate(&self, branch_id: &str) {
        self.entries.lock().pop(branch_id);
    }

    /// Drops every idle-expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| now.duration_since(e.last_access) >= self.idle_timeout)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Number of stored entries, including expired ones not yet dropped.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl Default for BranchStatusCache {
    fn default() -> Self {
        Self::new(KeeperConfig::default())
    }
}
