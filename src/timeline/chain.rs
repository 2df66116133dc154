/*!
 * Timeline Chain
 * Sparse point map with a monotonic signaled-prefix cursor
 *
 * # Architecture
 *
 * One chain backs one sync object. Points are a sparse ordered map; a
 * point with no entry is indistinguishable from an explicit `Unbound`
 * slot, and slots reset to `Unbound` are dropped from the map. The cursor
 * caches the highest point whose prefix `1..=cursor` has been observed
 * fully signaled; it only ever moves forward, even across resets.
 *
 * The chain itself is not thread-safe; the owning object wraps it in a
 * mutex. All operations are O(log n) in the number of live points.
 */

use crate::core::errors::SyncError;
use crate::core::types::{Generation, Point, SyncResult};
use crate::fence::{Fence, FenceSlot, SlotState};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct TimelineChain {
    points: BTreeMap<Point, FenceSlot>,
    cursor: Point,
    generation: Generation,
}

impl TimelineChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain whose binary point starts out signaled.
    #[must_use]
    pub fn new_signaled() -> Self {
        let mut chain = Self::default();
        chain.points.insert(0, FenceSlot::presignaled());
        chain
    }

    /// Mutation counter. Bumped by bind, host signal, reset, and
    /// transfer; in-flight waits use it to notice that a point they are
    /// watching may have changed.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// State of the slot at `point`. Absent points report `Unbound`.
    #[must_use]
    pub fn slot_state(&self, point: Point) -> SlotState {
        self.points
            .get(&point)
            .map_or(SlotState::Unbound, FenceSlot::state)
    }

    /// The fence attached at `point`, if one is pending there.
    #[must_use]
    pub fn fence_at(&self, point: Point) -> Option<Arc<dyn Fence>> {
        self.points.get(&point).and_then(FenceSlot::fence)
    }

    /// Attach a fence at `point`, creating the slot if absent.
    ///
    /// Fails with `AlreadyBound` if the slot already carries a live fence
    /// or a signal; reset it first to re-submit the point.
    pub fn bind_point(&mut self, point: Point, fence: Arc<dyn Fence>) -> SyncResult<()> {
        let slot = self.points.entry(point).or_default();
        slot.bind(fence)
            .map_err(|_| SyncError::AlreadyBound { point })?;
        self.generation += 1;
        Ok(())
    }

    /// Host-signal `point`, creating the slot if absent.
    ///
    /// An unbound slot is signaled directly; a pending one is latched
    /// signaled regardless of its fence. Point 0 is the binary path and
    /// behaves identically.
    pub fn signal_point(&mut self, point: Point) {
        let slot = self.points.entry(point).or_default();
        if slot.is_occupied() {
            slot.signal();
        } else {
            slot.signal_direct();
        }
        self.generation += 1;
    }

    /// Advance the cursor over the contiguous signaled prefix and return
    /// it.
    ///
    /// Starting at `cursor + 1`, each consecutive point that exists and
    /// is signaled moves the cursor; the walk stops at the first gap,
    /// unbound, or pending point. Results are monotonic across calls.
    pub fn query(&mut self) -> Point {
        while let Some(next) = self.cursor.checked_add(1) {
            match self.points.get(&next) {
                Some(slot) if slot.state() == SlotState::Signaled => self.cursor = next,
                _ => break,
            }
        }
        self.cursor
    }

    /// Highest point that currently carries a fence or a signal, 0 if
    /// none. Unlike [`query`](Self::query) this ignores gaps and
    /// completion.
    #[must_use]
    pub fn last_submitted(&self) -> Point {
        // Reset slots are dropped from the map, so every entry is live.
        self.points.keys().next_back().copied().unwrap_or(0)
    }

    /// Reset the slot at `point` to `Unbound`.
    ///
    /// The cursor is a high-water mark and is not rolled back, even when
    /// the reset point is at or below it.
    pub fn reset_point(&mut self, point: Point) {
        if self.points.remove(&point).is_some() {
            self.generation += 1;
        }
    }

    /// Reset every slot, keeping the cursor.
    pub fn reset_all(&mut self) {
        if !self.points.is_empty() {
            self.points.clear();
            self.generation += 1;
        }
    }

    /// Move a slot between two points of this chain.
    ///
    /// The destination is overwritten with the source's state and the
    /// source becomes `Unbound`. A nonexistent source is not an error:
    /// the transfer succeeds and leaves the destination `Unbound`.
    pub fn transfer_local(&mut self, src_point: Point, dst_point: Point) {
        let slot = self.take_slot(src_point);
        self.put_slot(dst_point, slot);
    }

    /// Remove and return the slot at `point` (transfer source side).
    #[must_use]
    pub fn take_slot(&mut self, point: Point) -> FenceSlot {
        match self.points.remove(&point) {
            Some(slot) => {
                self.generation += 1;
                slot
            }
            None => FenceSlot::unbound(),
        }
    }

    /// Overwrite the slot at `point` (transfer destination side).
    pub fn put_slot(&mut self, point: Point, slot: FenceSlot) {
        if slot.is_occupied() {
            self.points.insert(point, slot);
        } else {
            self.points.remove(&point);
        }
        self.generation += 1;
    }

    /// Number of live (occupied) points.
    #[must_use]
    pub fn live_points(&self) -> usize {
        self.points.len()
    }
}
