/*!
 * Software Timeline
 * Host-advanced fence producer for tests and software pipelines
 */

use super::traits::Fence;
use crate::core::sync::WaitCell;
use log::debug;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// A host-driven timeline that mints fences bound to sequence numbers.
///
/// A fence minted at seqno `n` signals once the timeline value reaches
/// `n`. The value only moves forward. Cloning shares the underlying
/// timeline.
#[derive(Debug, Clone, Default)]
pub struct SoftwareTimeline {
    inner: Arc<Mutex<TimelineInner>>,
}

#[derive(Debug, Default)]
struct TimelineInner {
    value: u64,
    pending: Vec<Arc<SoftwareFence>>,
}

impl SoftwareTimeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fence that signals when the timeline reaches `seqno`.
    ///
    /// A fence minted at or below the current value is born signaled.
    #[must_use]
    pub fn fence(&self, seqno: u64) -> Arc<SoftwareFence> {
        let mut inner = self.inner.lock();
        let fence = Arc::new(SoftwareFence {
            seqno,
            state: Mutex::new(FenceInner {
                signaled: inner.value >= seqno,
                waiters: Vec::new(),
            }),
        });
        if inner.value < seqno {
            inner.pending.push(Arc::clone(&fence));
        }
        fence
    }

    /// Move the timeline forward by `count`.
    pub fn advance(&self, count: u64) {
        let target = self.current().saturating_add(count);
        self.signal_to(target);
    }

    /// Move the timeline forward to `value`. Values at or below the
    /// current one are ignored.
    pub fn signal_to(&self, value: u64) {
        let fired: Vec<Arc<SoftwareFence>> = {
            let mut inner = self.inner.lock();
            if value <= inner.value {
                return;
            }
            inner.value = value;
            let (fired, pending) = inner
                .pending
                .drain(..)
                .partition(|fence| fence.seqno <= value);
            inner.pending = pending;
            fired
        };
        debug!(
            "software timeline advanced to {} ({} fences fired)",
            value,
            fired.len()
        );
        for fence in fired {
            fence.resolve();
        }
    }

    /// Current timeline value.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.inner.lock().value
    }

    /// Fences minted but not yet signaled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }
}

/// A fence minted by a [`SoftwareTimeline`].
#[derive(Debug)]
pub struct SoftwareFence {
    seqno: u64,
    state: Mutex<FenceInner>,
}

#[derive(Debug)]
struct FenceInner {
    signaled: bool,
    waiters: Vec<Weak<WaitCell>>,
}

impl SoftwareFence {
    /// Sequence number this fence fires at.
    #[must_use]
    pub fn seqno(&self) -> u64 {
        self.seqno
    }

    fn resolve(&self) {
        let waiters = {
            let mut state = self.state.lock();
            if state.signaled {
                return;
            }
            state.signaled = true;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            if let Some(cell) = waiter.upgrade() {
                cell.notify();
            }
        }
    }
}

impl Fence for SoftwareFence {
    fn is_signaled(&self) -> bool {
        self.state.lock().signaled
    }

    fn add_waiter(&self, waiter: &Arc<WaitCell>) -> bool {
        let mut state = self.state.lock();
        if state.signaled {
            return false;
        }
        state.waiters.push(Arc::downgrade(waiter));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_fires_at_seqno() {
        let timeline = SoftwareTimeline::new();
        let fence = timeline.fence(3);
        assert!(!fence.is_signaled());
        timeline.advance(2);
        assert!(!fence.is_signaled());
        timeline.advance(1);
        assert!(fence.is_signaled());
    }

    #[test]
    fn fence_below_current_is_born_signaled() {
        let timeline = SoftwareTimeline::new();
        timeline.signal_to(10);
        let fence = timeline.fence(5);
        assert!(fence.is_signaled());
        assert_eq!(timeline.pending_count(), 0);
    }

    #[test]
    fn timeline_is_monotonic() {
        let timeline = SoftwareTimeline::new();
        timeline.signal_to(7);
        timeline.signal_to(3);
        assert_eq!(timeline.current(), 7);
    }

    #[test]
    fn waiters_are_notified_on_resolve() {
        let timeline = SoftwareTimeline::new();
        let fence = timeline.fence(1);
        let cell = Arc::new(WaitCell::new());
        assert!(fence.add_waiter(&cell));
        timeline.advance(1);
        assert!(cell.is_notified());
    }

    #[test]
    fn add_waiter_rejects_after_signal() {
        let timeline = SoftwareTimeline::new();
        let fence = timeline.fence(1);
        timeline.advance(1);
        assert!(!fence.add_waiter(&Arc::new(WaitCell::new())));
    }

    #[test]
    fn dropped_waiters_are_skipped() {
        let timeline = SoftwareTimeline::new();
        let fence = timeline.fence(1);
        {
            let cell = Arc::new(WaitCell::new());
            fence.add_waiter(&cell);
        }
        timeline.advance(1);
        assert!(fence.is_signaled());
    }

    #[test]
    fn clones_share_the_timeline() {
        let timeline = SoftwareTimeline::new();
        let alias = timeline.clone();
        alias.advance(4);
        assert_eq!(timeline.current(), 4);
    }
}
