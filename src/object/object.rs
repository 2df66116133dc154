/*!
 * Sync Object
 * One timeline chain plus its notification channel
 */

use crate::core::sync::{WaitCell, WaitSet};
use crate::core::types::Handle;
use crate::timeline::TimelineChain;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// A handle-addressed synchronization object.
///
/// The chain is guarded by a coarse per-object mutex; waiters register
/// on the object's wait set and are woken after every chain mutation.
/// Waits hold their own `Arc` to the object, so a destroyed handle stays
/// alive until the last in-flight wait returns.
#[derive(Debug)]
pub struct SyncObject {
    handle: Handle,
    chain: Mutex<TimelineChain>,
    waiters: WaitSet,
}

impl SyncObject {
    #[must_use]
    pub(crate) fn new(handle: Handle, signaled: bool) -> Arc<Self> {
        let chain = if signaled {
            TimelineChain::new_signaled()
        } else {
            TimelineChain::new()
        };
        Arc::new(Self {
            handle,
            chain: Mutex::new(chain),
            waiters: WaitSet::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Lock the chain for reading or mutation.
    pub(crate) fn chain(&self) -> MutexGuard<'_, TimelineChain> {
        self.chain.lock()
    }

    /// Register a wait cell for mutation notifications.
    pub(crate) fn register_waiter(&self, cell: &Arc<WaitCell>) {
        self.waiters.register(cell);
    }

    /// Wake every wait watching this object. Called after each mutation,
    /// outside the chain lock.
    pub(crate) fn notify_waiters(&self) {
        self.waiters.notify_all();
    }

    /// Live wait registrations (primarily for introspection in tests).
    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }
}
