/*!
 * Fence Module
 * Completion sources: the capability trait, producers, and the point slot
 */

pub mod signaled;
pub mod slot;
pub mod software;
pub mod traits;

// Re-export public API
pub use signaled::SignaledFence;
pub use slot::{FenceSlot, SlotState};
pub use software::{SoftwareFence, SoftwareTimeline};
pub use traits::Fence;
