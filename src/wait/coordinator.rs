/*!
 * Wait Coordinator
 * Snapshot-isolated blocking over multiple objects and points
 *
 * # Architecture
 *
 * A wait captures each entry's fence instance at call entry (its
 * snapshot), registers one wait cell with every captured pending fence
 * and every still-unbound watched object, then loops: re-evaluate,
 * sleep on the cell, repeat. Producers and chain mutations never block;
 * they only flip the cell. Satisfaction is always decided by re-polling
 * the captured instances, so a reset or re-bind of a captured point
 * after the snapshot is invisible: entries answer to fence instances,
 * not to (handle, point) identity.
 *
 * Chain locks are taken one object at a time and never held while
 * sleeping or calling into fence code.
 */

use crate::core::errors::SyncError;
use crate::core::sync::WaitCell;
use crate::core::types::{Generation, Point, SyncResult};
use crate::fence::{Fence, SlotState};
use crate::object::{SyncObject, SyncObjectTable};
use crate::wait::types::{Deadline, WaitMode, WaitRequest};
use log::trace;
use std::sync::Arc;
use std::time::Instant;

/// Blocking wait engine over a shared object table.
#[derive(Debug, Clone)]
pub struct WaitCoordinator {
    table: SyncObjectTable,
}

/// Per-entry wait state. `instance` is the snapshot: once set, the entry
/// is satisfied by that fence alone.
struct Entry {
    object: Arc<SyncObject>,
    point: Point,
    instance: Option<Arc<dyn Fence>>,
    satisfied: bool,
    awaiting_submit: bool,
    seen_generation: Generation,
}

impl WaitCoordinator {
    #[must_use]
    pub fn new(table: SyncObjectTable) -> Self {
        Self { table }
    }

    /// Execute one wait request to completion.
    ///
    /// Returns the index of the first satisfied entry. Every handle is
    /// resolved and every entry validated before any outcome is reported:
    /// an unbound entry without submit-blocking fails the whole call with
    /// `InvalidArgument` even if other entries are already signaled.
    pub fn wait(&self, request: &WaitRequest) -> SyncResult<usize> {
        let started = Instant::now();
        if request.entries().is_empty() {
            return Err(SyncError::InvalidArgument(
                "wait request has no entries".to_string(),
            ));
        }

        let objects: Vec<Arc<SyncObject>> = request
            .entries()
            .iter()
            .map(|&(handle, _)| self.table.get(handle))
            .collect::<SyncResult<_>>()?;

        let cell = Arc::new(WaitCell::new());
        let mut entries: Vec<Entry> = Vec::with_capacity(objects.len());
        for (&(_, point), object) in request.entries().iter().zip(&objects) {
            entries.push(Self::capture(object, point, request, &cell)?);
        }
        trace!(
            "wait over {} entries ({:?}, for_submit: {}, available: {})",
            entries.len(),
            request.mode(),
            request.wait_for_submit(),
            request.wait_available()
        );

        loop {
            let mut first: Option<usize> = None;
            let mut all = true;
            for (index, entry) in entries.iter_mut().enumerate() {
                if !entry.satisfied {
                    Self::refresh(entry, request, &cell);
                }
                if entry.satisfied {
                    if first.is_none() {
                        first = Some(index);
                    }
                } else {
                    all = false;
                }
            }
            let done = match request.mode() {
                WaitMode::Any => first.is_some(),
                WaitMode::All => all,
            };
            if done {
                return Ok(first.unwrap_or(0));
            }

            let sleep_until = match request.deadline() {
                Deadline::NoWait => return Err(Self::timed_out(started, request.deadline())),
                Deadline::Forever => None,
                Deadline::At(at) => {
                    if Instant::now() >= at {
                        return Err(Self::timed_out(started, request.deadline()));
                    }
                    Some(at)
                }
            };
            cell.wait_until(sleep_until);
        }
    }

    /// Snapshot one entry and register the cell with whatever can wake
    /// it: the pending fence, or the object itself while unbound.
    fn capture(
        object: &Arc<SyncObject>,
        point: Point,
        request: &WaitRequest,
        cell: &Arc<WaitCell>,
    ) -> SyncResult<Entry> {
        let (state, instance, generation) = {
            let chain = object.chain();
            (
                chain.slot_state(point),
                chain.fence_at(point),
                chain.generation(),
            )
        };
        let mut entry = Entry {
            object: Arc::clone(object),
            point,
            instance,
            satisfied: false,
            awaiting_submit: false,
            seen_generation: generation,
        };
        match state {
            SlotState::Signaled => entry.satisfied = true,
            SlotState::Pending => {
                if request.wait_available() {
                    entry.satisfied = true;
                } else if let Some(fence) = &entry.instance {
                    if !fence.add_waiter(cell) {
                        entry.satisfied = true;
                    }
                }
            }
            SlotState::Unbound => {
                if !request.wait_for_submit() {
                    return Err(SyncError::InvalidArgument(format!(
                        "point {point} on object {} has no fence and the request does not block for submit",
                        object.handle()
                    )));
                }
                entry.awaiting_submit = true;
                object.register_waiter(cell);
            }
        }
        Ok(entry)
    }

    /// Re-evaluate one unsatisfied entry after a wake-up.
    ///
    /// Entries still awaiting submission re-read their chain only when
    /// its generation moved, and latch the first instance (or direct
    /// signal) they observe; latched entries only poll their instance.
    fn refresh(entry: &mut Entry, request: &WaitRequest, cell: &Arc<WaitCell>) {
        if entry.awaiting_submit {
            let (state, instance, generation) = {
                let chain = entry.object.chain();
                if chain.generation() == entry.seen_generation {
                    return;
                }
                (
                    chain.slot_state(entry.point),
                    chain.fence_at(entry.point),
                    chain.generation(),
                )
            };
            entry.seen_generation = generation;
            match state {
                SlotState::Signaled => {
                    entry.awaiting_submit = false;
                    entry.satisfied = true;
                }
                SlotState::Pending => {
                    entry.awaiting_submit = false;
                    entry.instance = instance;
                    if request.wait_available() {
                        entry.satisfied = true;
                    } else if let Some(fence) = &entry.instance {
                        if !fence.add_waiter(cell) {
                            entry.satisfied = true;
                        }
                    }
                }
                SlotState::Unbound => {}
            }
            return;
        }
        if let Some(fence) = &entry.instance {
            if fence.is_signaled() {
                entry.satisfied = true;
            }
        }
    }

    fn timed_out(started: Instant, deadline: Deadline) -> SyncError {
        let timeout_ms = match deadline {
            Deadline::NoWait => 0,
            Deadline::At(at) => at.saturating_duration_since(started).as_millis() as u64,
            Deadline::Forever => u64::MAX,
        };
        SyncError::TimedOut {
            elapsed_ms: started.elapsed().as_millis() as u64,
            timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fence::SoftwareTimeline;
    use std::thread;
    use std::time::Duration;

    fn setup() -> (SyncObjectTable, WaitCoordinator) {
        let table = SyncObjectTable::new();
        let coordinator = WaitCoordinator::new(table.clone());
        (table, coordinator)
    }

    #[test]
    fn any_reports_the_first_satisfied_index() {
        let (table, coordinator) = setup();
        let timeline = SoftwareTimeline::new();
        let a = table.create(false).unwrap();
        let b = table.create(false).unwrap();
        table.get(a).unwrap().chain().bind_point(1, timeline.fence(9)).unwrap();
        table.get(b).unwrap().chain().signal_point(1);

        let request = WaitRequest::any(&[(a, 1), (b, 1)]).with_deadline(Deadline::NoWait);
        assert_eq!(coordinator.wait(&request).unwrap(), 1);
    }

    #[test]
    fn all_blocks_until_every_entry_signals() {
        let (table, coordinator) = setup();
        let timeline = SoftwareTimeline::new();
        let handle = table.create(false).unwrap();
        let object = table.get(handle).unwrap();
        object.chain().bind_point(1, timeline.fence(1)).unwrap();
        object.chain().bind_point(2, timeline.fence(2)).unwrap();

        let advancer = {
            let timeline = timeline.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                timeline.advance(1);
                thread::sleep(Duration::from_millis(30));
                timeline.advance(1);
            })
        };
        let request = WaitRequest::all(&[(handle, 1), (handle, 2)])
            .with_deadline(Deadline::after(Duration::from_secs(10)));
        assert_eq!(coordinator.wait(&request).unwrap(), 0);
        advancer.join().unwrap();
    }

    #[test]
    fn unbound_entry_without_submit_blocking_is_rejected() {
        let (table, coordinator) = setup();
        let handle = table.create(false).unwrap();
        table.get(handle).unwrap().chain().signal_point(1);

        // Entry 2 is unbound; the error wins over the satisfied entry 1.
        let request = WaitRequest::any(&[(handle, 1), (handle, 2)]).with_deadline(Deadline::NoWait);
        assert!(matches!(
            coordinator.wait(&request).unwrap_err(),
            SyncError::InvalidArgument(_)
        ));
    }

    #[test]
    fn pending_entry_times_out_on_immediate_deadline() {
        let (table, coordinator) = setup();
        let timeline = SoftwareTimeline::new();
        let handle = table.create(false).unwrap();
        table
            .get(handle)
            .unwrap()
            .chain()
            .bind_point(1, timeline.fence(1))
            .unwrap();

        let request = WaitRequest::all(&[(handle, 1)]).with_deadline(Deadline::NoWait);
        let err = coordinator.wait(&request).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn available_is_satisfied_by_a_pending_fence() {
        let (table, coordinator) = setup();
        let timeline = SoftwareTimeline::new();
        let handle = table.create(false).unwrap();
        table
            .get(handle)
            .unwrap()
            .chain()
            .bind_point(1, timeline.fence(5))
            .unwrap();

        let request = WaitRequest::all(&[(handle, 1)])
            .until_available()
            .with_deadline(Deadline::NoWait);
        assert_eq!(coordinator.wait(&request).unwrap(), 0);
    }

    #[test]
    fn for_submit_latches_a_late_bind() {
        let (table, coordinator) = setup();
        let timeline = SoftwareTimeline::new();
        let handle = table.create(false).unwrap();
        let object = table.get(handle).unwrap();

        let binder = {
            let timeline = timeline.clone();
            let object = Arc::clone(&object);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                object.chain().bind_point(1, timeline.fence(1)).unwrap();
                object.notify_waiters();
                thread::sleep(Duration::from_millis(30));
                timeline.advance(1);
            })
        };
        let request = WaitRequest::all(&[(handle, 1)])
            .for_submit()
            .with_deadline(Deadline::after(Duration::from_secs(10)));
        assert_eq!(coordinator.wait(&request).unwrap(), 0);
        binder.join().unwrap();
    }

    #[test]
    fn direct_signal_satisfies_a_submit_blocked_wait() {
        let (table, coordinator) = setup();
        let handle = table.create(false).unwrap();
        let object = table.get(handle).unwrap();

        let signaler = thread::spawn({
            let object = Arc::clone(&object);
            move || {
                thread::sleep(Duration::from_millis(30));
                object.chain().signal_point(4);
                object.notify_waiters();
            }
        });
        let request = WaitRequest::all(&[(handle, 4)])
            .for_submit()
            .with_deadline(Deadline::after(Duration::from_secs(10)));
        assert_eq!(coordinator.wait(&request).unwrap(), 0);
        signaler.join().unwrap();
    }

    #[test]
    fn empty_requests_are_rejected() {
        let (_, coordinator) = setup();
        let request = WaitRequest::any(&[]);
        assert!(matches!(
            coordinator.wait(&request).unwrap_err(),
            SyncError::InvalidArgument(_)
        ));
    }

    #[test]
    fn timeout_reports_elapsed_and_budget() {
        let (table, coordinator) = setup();
        let timeline = SoftwareTimeline::new();
        let handle = table.create(false).unwrap();
        table
            .get(handle)
            .unwrap()
            .chain()
            .bind_point(1, timeline.fence(1))
            .unwrap();

        let request = WaitRequest::all(&[(handle, 1)])
            .with_deadline(Deadline::after(Duration::from_millis(40)));
        match coordinator.wait(&request).unwrap_err() {
            SyncError::TimedOut {
                elapsed_ms,
                timeout_ms,
            } => {
                assert!(elapsed_ms >= 30);
                assert!((30..=500).contains(&timeout_ms));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
