/*!
 * Sync Engine
 * Caller-facing facade over the object table and the wait coordinator
 *
 * # Architecture
 *
 * The engine owns a handle table and a wait coordinator sharing that
 * table. Every mutation follows the same shape: resolve handles up
 * front (array operations validate all handles before touching any
 * object), apply the change under the object's chain lock, then notify
 * that object's waiters with no lock held. Engines are cheap to clone
 * and fully independent of each other; nothing here is global.
 *
 * # Performance
 *
 * Handle resolution is a lock-free map read. Mutations lock exactly one
 * chain at a time, including cross-object transfers, so no ordering
 * between chain locks ever arises. Stats counters are relaxed atomics.
 */

use crate::core::errors::SyncError;
use crate::core::types::{Handle, Point, SyncResult, BINARY_POINT};
use crate::fence::{Fence, SlotState};
use crate::object::SyncObjectTable;
use crate::wait::{WaitCoordinator, WaitRequest};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Point-in-time engine statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub objects_live: usize,
    pub objects_created: u64,
    pub objects_destroyed: u64,
    pub fences_bound: u64,
    pub points_signaled: u64,
    pub transfers: u64,
    pub waits_started: u64,
    pub waits_satisfied: u64,
    pub waits_timed_out: u64,
}

#[derive(Debug, Default)]
struct Counters {
    objects_created: AtomicU64,
    objects_destroyed: AtomicU64,
    fences_bound: AtomicU64,
    points_signaled: AtomicU64,
    transfers: AtomicU64,
    waits_started: AtomicU64,
    waits_satisfied: AtomicU64,
    waits_timed_out: AtomicU64,
}

/// Timeline sync object engine
#[derive(Debug, Clone)]
pub struct SyncEngine {
    table: SyncObjectTable,
    coordinator: WaitCoordinator,
    counters: Arc<Counters>,
}

impl SyncEngine {
    #[must_use]
    pub fn new() -> Self {
        let table = SyncObjectTable::new();
        let coordinator = WaitCoordinator::new(table.clone());
        Self {
            table,
            coordinator,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Create a sync object with every point unbound
    pub fn create(&self) -> SyncResult<Handle> {
        let handle = self.table.create(false)?;
        self.counters.objects_created.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    /// Create a sync object whose binary point starts signaled
    pub fn create_signaled(&self) -> SyncResult<Handle> {
        let handle = self.table.create(true)?;
        self.counters.objects_created.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    /// Destroy a sync object. In-flight waits keep the captured fence
    /// instances alive and resolve on their own.
    pub fn destroy(&self, handle: Handle) -> SyncResult<()> {
        self.table.destroy(handle)?;
        self.counters
            .objects_destroyed
            .fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.table.contains(handle)
    }

    /// Attach a fence to a point. Fails with `AlreadyBound` if the slot
    /// already carries a live fence.
    pub fn bind(&self, handle: Handle, point: Point, fence: Arc<dyn Fence>) -> SyncResult<()> {
        let object = self.table.get(handle)?;
        object.chain().bind_point(point, fence)?;
        object.notify_waiters();
        self.counters.fences_bound.fetch_add(1, Ordering::Relaxed);
        debug!("bound fence at point {point} of object {handle}");
        Ok(())
    }

    /// Host-signal a set of points on one object. Unbound points become
    /// signaled directly; pending points are forced signaled.
    pub fn signal_points(&self, handle: Handle, points: &[Point]) -> SyncResult<()> {
        if points.is_empty() {
            return Err(SyncError::InvalidArgument(
                "no points to signal".to_string(),
            ));
        }
        let object = self.table.get(handle)?;
        {
            let mut chain = object.chain();
            for &point in points {
                chain.signal_point(point);
            }
        }
        object.notify_waiters();
        self.counters
            .points_signaled
            .fetch_add(points.len() as u64, Ordering::Relaxed);
        debug!("signaled {} point(s) of object {handle}", points.len());
        Ok(())
    }

    /// Host-signal the binary point of each object. All handles are
    /// validated before any object is touched.
    pub fn signal(&self, handles: &[Handle]) -> SyncResult<()> {
        if handles.is_empty() {
            return Err(SyncError::InvalidArgument(
                "no handles to signal".to_string(),
            ));
        }
        let objects = self.table.get_all(handles)?;
        for object in &objects {
            object.chain().signal_point(BINARY_POINT);
            object.notify_waiters();
        }
        self.counters
            .points_signaled
            .fetch_add(handles.len() as u64, Ordering::Relaxed);
        debug!("signaled binary point of {} object(s)", handles.len());
        Ok(())
    }

    /// Highest contiguously signaled point of an object
    pub fn query(&self, handle: Handle) -> SyncResult<Point> {
        let object = self.table.get(handle)?;
        let value = object.chain().query();
        Ok(value)
    }

    /// Highest point that ever carried a binding, 0 if none
    pub fn last_submitted(&self, handle: Handle) -> SyncResult<Point> {
        let object = self.table.get(handle)?;
        let value = object.chain().last_submitted();
        Ok(value)
    }

    /// Slot state at an exact point. Absent points report `Unbound`.
    pub fn point_state(&self, handle: Handle, point: Point) -> SyncResult<SlotState> {
        let object = self.table.get(handle)?;
        let state = object.chain().slot_state(point);
        Ok(state)
    }

    /// Return a set of points to `Unbound`. The query cursor is a
    /// high-water mark and does not move back.
    pub fn reset_points(&self, handle: Handle, points: &[Point]) -> SyncResult<()> {
        if points.is_empty() {
            return Err(SyncError::InvalidArgument("no points to reset".to_string()));
        }
        let object = self.table.get(handle)?;
        {
            let mut chain = object.chain();
            for &point in points {
                chain.reset_point(point);
            }
        }
        object.notify_waiters();
        debug!("reset {} point(s) of object {handle}", points.len());
        Ok(())
    }

    /// Return every live point of each object to `Unbound`. All handles
    /// are validated before any object is touched.
    pub fn reset(&self, handles: &[Handle]) -> SyncResult<()> {
        if handles.is_empty() {
            return Err(SyncError::InvalidArgument(
                "no handles to reset".to_string(),
            ));
        }
        let objects = self.table.get_all(handles)?;
        for object in &objects {
            object.chain().reset_all();
            object.notify_waiters();
        }
        debug!("reset {} object(s)", handles.len());
        Ok(())
    }

    /// Move the slot at (src, src_point) to (dst, dst_point). The
    /// destination is overwritten, the source becomes unbound. A source
    /// point that was never bound moves an unbound slot.
    pub fn transfer(
        &self,
        src: Handle,
        src_point: Point,
        dst: Handle,
        dst_point: Point,
    ) -> SyncResult<()> {
        let source = self.table.get(src)?;
        let destination = self.table.get(dst)?;
        if src == dst {
            source.chain().transfer_local(src_point, dst_point);
            source.notify_waiters();
        } else {
            let slot = source.chain().take_slot(src_point);
            source.notify_waiters();
            destination.chain().put_slot(dst_point, slot);
            destination.notify_waiters();
        }
        self.counters.transfers.fetch_add(1, Ordering::Relaxed);
        debug!("transferred point {src_point} of object {src} to point {dst_point} of object {dst}");
        Ok(())
    }

    /// Block per the request. Returns the index of the first satisfied
    /// entry.
    pub fn wait(&self, request: &WaitRequest) -> SyncResult<usize> {
        self.counters.waits_started.fetch_add(1, Ordering::Relaxed);
        match self.coordinator.wait(request) {
            Ok(first) => {
                self.counters
                    .waits_satisfied
                    .fetch_add(1, Ordering::Relaxed);
                Ok(first)
            }
            Err(err) => {
                if err.is_timeout() {
                    self.counters
                        .waits_timed_out
                        .fetch_add(1, Ordering::Relaxed);
                }
                Err(err)
            }
        }
    }

    /// Run the blocking wait on the blocking-task pool
    #[cfg(feature = "tokio")]
    pub async fn wait_async(&self, request: WaitRequest) -> SyncResult<usize> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.wait(&request))
            .await
            .map_err(|err| SyncError::Cancelled(err.to_string()))?
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            objects_live: self.table.len(),
            objects_created: self.counters.objects_created.load(Ordering::Relaxed),
            objects_destroyed: self.counters.objects_destroyed.load(Ordering::Relaxed),
            fences_bound: self.counters.fences_bound.load(Ordering::Relaxed),
            points_signaled: self.counters.points_signaled.load(Ordering::Relaxed),
            transfers: self.counters.transfers.load(Ordering::Relaxed),
            waits_started: self.counters.waits_started.load(Ordering::Relaxed),
            waits_satisfied: self.counters.waits_satisfied.load(Ordering::Relaxed),
            waits_timed_out: self.counters.waits_timed_out.load(Ordering::Relaxed),
        }
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}
