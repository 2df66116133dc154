/*!
 * Wait Cell
 * One-shot consumable notification with deadline-aware blocking
 */

use parking_lot::{Condvar, Mutex};
use std::time::Instant;

/// A consumable notification flag one wait blocks on.
///
/// `notify` sets the flag and wakes the blocked thread; `wait_until`
/// consumes the flag, blocking first if it is clear. Because the flag is
/// sticky, a notification that lands while the owner is busy re-evaluating
/// its condition is picked up by the next `wait_until` instead of being
/// lost.
#[derive(Debug, Default)]
pub struct WaitCell {
    state: Mutex<bool>,
    condvar: Condvar,
}

impl WaitCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake the owner if it is blocked.
    pub fn notify(&self) {
        let mut notified = self.state.lock();
        *notified = true;
        self.condvar.notify_all();
    }

    /// Block until notified or the deadline passes.
    ///
    /// Consumes the flag. `None` blocks forever. Returns `true` if a
    /// notification was consumed, `false` if the deadline elapsed first.
    pub fn wait_until(&self, deadline: Option<Instant>) -> bool {
        let mut notified = self.state.lock();
        loop {
            if *notified {
                *notified = false;
                return true;
            }
            match deadline {
                None => self.condvar.wait(&mut notified),
                Some(at) => {
                    if Instant::now() >= at {
                        return false;
                    }
                    if self.condvar.wait_until(&mut notified, at).timed_out() {
                        // A racing notify may have landed with the timeout.
                        if *notified {
                            *notified = false;
                            return true;
                        }
                        return false;
                    }
                }
            }
        }
    }

    /// True if a notification is pending and unconsumed.
    #[must_use]
    pub fn is_notified(&self) -> bool {
        *self.state.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn notify_before_wait_is_consumed() {
        let cell = WaitCell::new();
        cell.notify();
        assert!(cell.is_notified());
        assert!(cell.wait_until(Some(Instant::now())));
        assert!(!cell.is_notified());
    }

    #[test]
    fn wait_times_out_without_notify() {
        let cell = WaitCell::new();
        let start = Instant::now();
        let woken = cell.wait_until(Some(start + Duration::from_millis(20)));
        assert!(!woken);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn cross_thread_wake() {
        let cell = Arc::new(WaitCell::new());
        let cell2 = Arc::clone(&cell);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            cell2.notify();
        });
        let woken = cell.wait_until(Some(Instant::now() + Duration::from_secs(5)));
        assert!(woken);
        handle.join().unwrap();
    }

    #[test]
    fn flag_is_single_shot() {
        let cell = WaitCell::new();
        cell.notify();
        assert!(cell.wait_until(Some(Instant::now())));
        assert!(!cell.wait_until(Some(Instant::now())));
    }
}
