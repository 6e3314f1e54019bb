//! Per-resource bookkeeping of which local resource is held for which branch.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use common::{BranchStatus, BranchType};
use parking_lot::Mutex;

use crate::cache::BranchStatusCache;
use crate::error::{KeeperError, KeeperOperation, Result};
use crate::holdable::Holdable;

/// Identity and metadata of the resource a keeper belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceInfo {
    pub resource_id: String,
    pub resource_group_id: Option<String>,
    pub branch_type: BranchType,
    pub db_type: Option<String>,
}

impl ResourceInfo {
    pub fn new(resource_id: impl Into<String>, branch_type: BranchType) -> Self {
        Self {
            resource_id: resource_id.into(),
            branch_type,
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.resource_group_id = Some(group_id.into());
        self
    }

    pub fn with_db_type(mut self, db_type: impl Into<String>) -> Self {
        self.db_type = Some(db_type.into());
        self
    }
}

/// Tracks, for one resource manager, which [`Holdable`] is held under which
/// branch key.
///
/// A key maps to at most one resource, and a resource is kept under at most
/// one key. Any request that contradicts the current mapping is reported as
/// [`KeeperError::ShouldNeverHappen`].
///
/// Hold, release and lookup are serialized on one lock. The branch status
/// cache is shared between keepers and locks independently.
pub struct ResourceKeeper<T> {
    resource: ResourceInfo,
    should_be_held: AtomicBool,
    keeper: Mutex<HashMap<String, Arc<T>>>,
    branch_status: Arc<BranchStatusCache>,
}

impl<T: Holdable + Debug> ResourceKeeper<T> {
    pub fn new(resource: ResourceInfo, branch_status: Arc<BranchStatusCache>) -> Self {
        Self {
            resource,
            should_be_held: AtomicBool::new(false),
            keeper: Mutex::new(HashMap::new()),
            branch_status,
        }
    }

    pub fn resource(&self) -> &ResourceInfo {
        &self.resource
    }

    pub fn resource_id(&self) -> &str {
        &self.resource.resource_id
    }

    /// Whether branch resources must stay held between phase one and phase
    /// two (XA mode, for example).
    pub fn should_be_held(&self) -> bool {
        self.should_be_held.load(Ordering::Acquire)
    }

    pub fn set_should_be_held(&self, should_be_held: bool) {
        self.should_be_held.store(should_be_held, Ordering::Release);
    }

    /// Holds `value` under `key`.
    ///
    /// Holding the same resource again under the same key is a no-op and
    /// returns it. Holding under a key that keeps another resource, or
    /// holding a resource already held elsewhere, is fatal.
    pub fn hold(&self, key: &str, value: Arc<T>) -> Result<Option<Arc<T>>> {
        let mut keeper = self.keeper.lock();

        match keeper.get(key).cloned() {
            Some(kept) if Arc::ptr_eq(&kept, &value) => {
                value.set_held(true);
                return Ok(Some(value));
            }
            Some(kept) => {
                drop(keeper);
                return Err(self.inconsistency(KeeperOperation::Hold, key, Some(&kept), &value));
            }
            None if value.is_held() => {
                drop(keeper);
                return Err(self.inconsistency(KeeperOperation::Hold, key, None, &value));
            }
            None => {}
        }

        let previous = keeper.insert(key.to_string(), Arc::clone(&value));
        value.set_held(true);
        drop(keeper);

        metrics::counter!("resource_keeper_hold_total").increment(1);
        tracing::debug!(resource_id = %self.resource.resource_id, %key, "resource held");
        Ok(previous)
    }

    /// Releases `value` from `key` and returns it.
    ///
    /// The key must currently keep exactly `value`. Otherwise the mapping is
    /// left as it was and the call fails as fatal.
    pub fn release(&self, key: &str, value: &Arc<T>) -> Result<Arc<T>> {
        let mut keeper = self.keeper.lock();

        match keeper.remove(key) {
            Some(kept) if Arc::ptr_eq(&kept, value) => {
                value.set_held(false);
                drop(keeper);

                metrics::counter!("resource_keeper_release_total").increment(1);
                tracing::debug!(resource_id = %self.resource.resource_id, %key, "resource released");
                Ok(kept)
            }
            Some(kept) => {
                keeper.insert(key.to_string(), Arc::clone(&kept));
                drop(keeper);
                Err(self.inconsistency(KeeperOperation::Release, key, Some(&kept), value))
            }
            None => {
                drop(keeper);
                Err(self.inconsistency(KeeperOperation::Release, key, None, value))
            }
        }
    }

    pub fn lookup(&self, key: &str) -> Option<Arc<T>> {
        self.keeper.lock().get(key).cloned()
    }

    /// Number of currently held resources.
    pub fn len(&self) -> usize {
        self.keeper.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keeper.lock().is_empty()
    }

    /// Snapshot of the keys currently holding a resource.
    pub fn held_keys(&self) -> Vec<String> {
        self.keeper.lock().keys().cloned().collect()
    }

    pub fn set_branch_status(&self, branch_id: &str, status: BranchStatus) {
        self.branch_status.put(branch_id, status);
    }

    pub fn get_branch_status(&self, branch_id: &str) -> Option<BranchStatus> {
        self.branch_status.get(branch_id)
    }

    /// Forgets the cached status of `branch_id`. Blank ids are ignored.
    pub fn clear_branch_status(&self, branch_id: &str) {
        if !branch_id.trim().is_empty() {
            self.branch_status.invalidate(branch_id);
        }
    }

    /// Builds and reports a fatal error. Must run without the map lock held.
    fn inconsistency(
        &self,
        operation: KeeperOperation,
        key: &str,
        kept: Option<&Arc<T>>,
        offered: &Arc<T>,
    ) -> KeeperError {
        let kept = kept.map_or_else(|| "none".to_string(), |k| format!("{k:?}"));
        let offered = format!("{offered:?}");

        metrics::counter!("resource_keeper_fatal_total").increment(1);
        tracing::error!(
            resource_id = %self.resource.resource_id,
            %operation,
            %key,
            %kept,
            %offered,
            "resource keeper inconsistency"
        );

        KeeperError::ShouldNeverHappen {
            operation,
            key: key.to_string(),
            kept,
            offered,
        }
    }
}

impl<T> Debug for ResourceKeeper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceKeeper")
            .field("resource", &self.resource)
            .field("should_be_held", &self.should_be_held)
            .field("held", &self.keeper.lock().len())
            .finish()
    }
}
