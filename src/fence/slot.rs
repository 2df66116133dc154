/*!
 * Fence Slot
 * One completion source bound to one timeline point
 */

use super::traits::Fence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Observable state of one slot.
///
/// A never-created point reports `Unbound`; absence is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// No completion source attached
    Unbound,
    /// A fence is attached but has not fired
    Pending,
    /// Completion observed; permanent until an explicit reset
    Signaled,
}

/// Raised by [`FenceSlot::bind`] when the slot already carries a live
/// fence or a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyBound;

/// The smallest unit of the engine: one point's completion tracking.
///
/// Transitions: `Unbound -> Pending` (bind), `Pending -> Signaled` (the
/// fence fires, or the host asserts completion), `Unbound -> Signaled`
/// (direct host signal), anything `-> Unbound` (reset). Once `Signaled`
/// the slot never reverts except via reset.
#[derive(Debug, Default)]
pub struct FenceSlot {
    binding: Binding,
}

#[derive(Debug, Default)]
enum Binding {
    #[default]
    Unbound,
    Pending(Arc<dyn Fence>),
    Signaled,
}

impl FenceSlot {
    #[must_use]
    pub fn unbound() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn presignaled() -> Self {
        Self {
            binding: Binding::Signaled,
        }
    }

    /// Current state, polling the attached fence if one is pending.
    ///
    /// The poll is read-only: a fence observed signaled keeps reporting
    /// `Signaled` on its own, so nothing needs to be cached here.
    #[must_use]
    pub fn state(&self) -> SlotState {
        match &self.binding {
            Binding::Unbound => SlotState::Unbound,
            Binding::Pending(fence) => {
                if fence.is_signaled() {
                    SlotState::Signaled
                } else {
                    SlotState::Pending
                }
            }
            Binding::Signaled => SlotState::Signaled,
        }
    }

    /// The attached fence, if any.
    #[must_use]
    pub fn fence(&self) -> Option<Arc<dyn Fence>> {
        match &self.binding {
            Binding::Pending(fence) => Some(Arc::clone(fence)),
            _ => None,
        }
    }

    /// True if a fence or signal occupies the slot.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        !matches!(self.binding, Binding::Unbound)
    }

    /// Attach a fence: `Unbound -> Pending`.
    ///
    /// An occupied slot (pending or signaled) must be reset before it can
    /// carry a new fence.
    pub fn bind(&mut self, fence: Arc<dyn Fence>) -> Result<(), AlreadyBound> {
        match self.binding {
            Binding::Unbound => {
                self.binding = Binding::Pending(fence);
                Ok(())
            }
            _ => Err(AlreadyBound),
        }
    }

    /// Host-asserted completion of a pending slot: `Pending -> Signaled`.
    ///
    /// Drops the attached fence; the slot stays signaled even if that
    /// fence never fires. No-op on `Signaled` or `Unbound`.
    pub fn signal(&mut self) {
        if matches!(self.binding, Binding::Pending(_)) {
            self.binding = Binding::Signaled;
        }
    }

    /// Direct host signal with no backing producer: `Unbound -> Signaled`.
    ///
    /// No-op if the slot is occupied.
    pub fn signal_direct(&mut self) {
        if matches!(self.binding, Binding::Unbound) {
            self.binding = Binding::Signaled;
        }
    }

    /// Return to `Unbound` from any state.
    pub fn reset(&mut self) {
        self.binding = Binding::Unbound;
    }

    /// Move the slot's contents out, leaving it `Unbound`.
    #[must_use]
    pub fn take(&mut self) -> FenceSlot {
        std::mem::take(self)
    }
}
