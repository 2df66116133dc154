/*!
 * Fence Trait
 * Capability interface over any completion source
 */

use crate::core::sync::WaitCell;
use std::fmt::Debug;
use std::sync::Arc;

/// An opaque completion source that eventually resolves to signaled.
///
/// Producers expose exactly the two capabilities the engine consumes: an
/// instantaneous poll and a wake subscription. Once signaled, a fence
/// stays signaled for the rest of its life; only the slot holding it can
/// be reset, never the fence itself.
pub trait Fence: Debug + Send + Sync {
    /// Poll the current state.
    fn is_signaled(&self) -> bool;

    /// Register a waiter to be woken when the fence signals.
    ///
    /// Returns `false` without registering if the fence is already
    /// signaled; the caller should treat the fence as complete instead of
    /// blocking. Registrations are weak: a waiter whose cell was dropped
    /// is discarded at signal time.
    fn add_waiter(&self, waiter: &Arc<WaitCell>) -> bool;
}
