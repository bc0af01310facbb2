//! Per-tab store of the last successful discovery result.
//!
//! Entries are inserted when a resolution succeeds and removed when the tab
//! navigates to another URL or closes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::DiscoveryResult;

/// Browser tab identifier.
pub type TabId = u64;

pub trait SegmentCache: Send + Sync {
    fn get(&self, tab: TabId) -> Option<DiscoveryResult>;

    fn set(&self, tab: TabId, result: DiscoveryResult);

    /// Remove the tab's entry. Returns whether one existed.
    fn delete(&self, tab: TabId) -> bool;
}

/// Process-local [`SegmentCache`].
#[derive(Debug, Default)]
pub struct MemorySegmentCache {
    entries: Mutex<HashMap<TabId, DiscoveryResult>>,
}

impl MemorySegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TabId, DiscoveryResult>> {
        // Every critical section is a single map operation.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SegmentCache for MemorySegmentCache {
    fn get(&self, tab: TabId) -> Option<DiscoveryResult> {
        self.lock().get(&tab).cloned()
    }

    fn set(&self, tab: TabId, result: DiscoveryResult) {
        tracing::debug!(tab, status = %result.status, "Caching discovery result");
        self.lock().insert(tab, result);
    }

    fn delete(&self, tab: TabId) -> bool {
        let removed = self.lock().remove(&tab).is_some();
        if removed {
            tracing::debug!(tab, "Cache entry removed");
        }
        removed
    }
}
