/*!
 * Sync Object Table
 * Process-wide handle registry with per-object lifecycle
 *
 * # Performance
 *
 * - Sharded concurrent map keyed by handle, no global lock
 * - Freed handles are recycled through a lock-free queue
 * - Lookups clone an `Arc`, so callers never hold table locks while
 *   touching chain state
 */

use super::object::SyncObject;
use crate::core::errors::SyncError;
use crate::core::types::{Handle, SyncResult, NULL_HANDLE};
use ahash::RandomState;
use crossbeam_queue::SegQueue;
use dashmap::DashMap;
use log::info;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Maximum live objects per table
pub const MAX_SYNC_OBJECTS: usize = 65_536;

/// Registry mapping opaque handles to sync objects.
///
/// Clones share the same underlying table. Handles start at 1; 0 is the
/// invalid placeholder and is never allocated.
#[derive(Debug, Clone)]
pub struct SyncObjectTable {
    objects: Arc<DashMap<Handle, Arc<SyncObject>, RandomState>>,
    next_handle: Arc<AtomicU32>,
    free_handles: Arc<SegQueue<Handle>>,
}

impl SyncObjectTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_handle: Arc::new(AtomicU32::new(1)),
            free_handles: Arc::new(SegQueue::new()),
        }
    }

    /// Create a new object, optionally with point 0 pre-signaled.
    pub fn create(&self, signaled: bool) -> SyncResult<Handle> {
        if self.objects.len() >= MAX_SYNC_OBJECTS {
            return Err(SyncError::LimitExceeded(format!(
                "table already holds {MAX_SYNC_OBJECTS} objects"
            )));
        }
        let handle = self
            .free_handles
            .pop()
            .unwrap_or_else(|| self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.objects.insert(handle, SyncObject::new(handle, signaled));
        info!("created sync object {} (signaled: {})", handle, signaled);
        Ok(handle)
    }

    /// Drop the table's reference to `handle` and recycle it.
    ///
    /// In-flight waits keep their own references; the object's state
    /// stays alive (and their snapshots valid) until those waits return.
    pub fn destroy(&self, handle: Handle) -> SyncResult<()> {
        match self.objects.remove(&handle) {
            Some(_) => {
                self.free_handles.push(handle);
                info!("destroyed sync object {}", handle);
                Ok(())
            }
            None => Err(Self::unknown(handle)),
        }
    }

    /// Resolve a handle to its object.
    pub fn get(&self, handle: Handle) -> SyncResult<Arc<SyncObject>> {
        self.objects
            .get(&handle)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Self::unknown(handle))
    }

    /// Resolve every handle or fail without side effects.
    pub fn get_all(&self, handles: &[Handle]) -> SyncResult<Vec<Arc<SyncObject>>> {
        handles.iter().map(|&handle| self.get(handle)).collect()
    }

    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains_key(&handle)
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn unknown(handle: Handle) -> SyncError {
        if handle == NULL_HANDLE {
            SyncError::NotFound("null placeholder handle".to_string())
        } else {
            SyncError::InvalidHandle(handle)
        }
    }
}

impl Default for SyncObjectTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_allocates_distinct_handles() {
        let table = SyncObjectTable::new();
        let a = table.create(false).unwrap();
        let b = table.create(false).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, NULL_HANDLE);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn destroyed_handles_are_recycled() {
        let table = SyncObjectTable::new();
        let a = table.create(false).unwrap();
        table.destroy(a).unwrap();
        let b = table.create(false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_handles_are_reported() {
        let table = SyncObjectTable::new();
        assert!(matches!(
            table.get(42).unwrap_err(),
            SyncError::InvalidHandle(42)
        ));
        assert!(matches!(
            table.get(NULL_HANDLE).unwrap_err(),
            SyncError::NotFound(_)
        ));
        assert!(matches!(
            table.destroy(42).unwrap_err(),
            SyncError::InvalidHandle(42)
        ));
    }

    #[test]
    fn get_all_fails_atomically() {
        let table = SyncObjectTable::new();
        let a = table.create(false).unwrap();
        let err = table.get_all(&[a, 999]).unwrap_err();
        assert!(matches!(err, SyncError::InvalidHandle(999)));
    }

    #[test]
    fn objects_outlive_destroy_while_referenced() {
        let table = SyncObjectTable::new();
        let handle = table.create(false).unwrap();
        let object = table.get(handle).unwrap();
        table.destroy(handle).unwrap();
        assert!(!table.contains(handle));
        object.chain().signal_point(1);
        assert_eq!(object.chain().query(), 1);
    }

    #[test]
    fn concurrent_create_and_destroy() {
        use std::thread;

        let table = SyncObjectTable::new();
        let mut joins = Vec::new();
        for _ in 0..8 {
            let table = table.clone();
            joins.push(thread::spawn(move || {
                for _ in 0..100 {
                    let handle = table.create(false).unwrap();
                    assert!(table.contains(handle));
                    table.destroy(handle).unwrap();
                }
            }));
        }
        for join in joins {
            join.join().unwrap();
        }
        assert!(table.is_empty());
    }
}
