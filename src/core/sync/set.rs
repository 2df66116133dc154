/*!
 * Wait Set
 * Per-object registry of live wait cells
 */

use super::cell::WaitCell;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Prune dead registrations once the list reaches this length.
const PRUNE_THRESHOLD: usize = 32;

/// The notification channel of one sync object.
///
/// Waits register their cell here while they are interested in chain
/// mutations; every mutation calls `notify_all`. Registrations are weak,
/// so a wait that returns (or is cancelled) withdraws itself by dropping
/// its cell.
#[derive(Debug, Default)]
pub struct WaitSet {
    waiters: Mutex<Vec<Weak<WaitCell>>>,
}

impl WaitSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cell for future notifications.
    pub fn register(&self, cell: &Arc<WaitCell>) {
        let mut waiters = self.waiters.lock();
        if waiters.len() >= PRUNE_THRESHOLD {
            waiters.retain(|w| w.strong_count() > 0);
        }
        waiters.push(Arc::downgrade(cell));
    }

    /// Wake every live registration. Returns the number woken.
    pub fn notify_all(&self) -> usize {
        let cells: Vec<Arc<WaitCell>> = {
            let mut waiters = self.waiters.lock();
            let live: Vec<_> = waiters.iter().filter_map(Weak::upgrade).collect();
            if live.len() < waiters.len() {
                waiters.retain(|w| w.strong_count() > 0);
            }
            live
        };
        for cell in &cells {
            cell.notify();
        }
        cells.len()
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waiters.lock().iter().filter(|w| w.strong_count() > 0).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_reaches_registered_cells() {
        let set = WaitSet::new();
        let a = Arc::new(WaitCell::new());
        let b = Arc::new(WaitCell::new());
        set.register(&a);
        set.register(&b);
        assert_eq!(set.notify_all(), 2);
        assert!(a.is_notified());
        assert!(b.is_notified());
    }

    #[test]
    fn dropped_cells_are_pruned() {
        let set = WaitSet::new();
        let a = Arc::new(WaitCell::new());
        set.register(&a);
        {
            let dead = Arc::new(WaitCell::new());
            set.register(&dead);
        }
        assert_eq!(set.notify_all(), 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_set_notifies_nobody() {
        let set = WaitSet::new();
        assert_eq!(set.notify_all(), 0);
        assert!(set.is_empty());
    }
}
