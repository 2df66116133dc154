/*!
 * Syncpoint Library
 * Timeline sync object engine exposed as a library
 */

pub mod core;
pub mod engine;
pub mod fence;
pub mod object;
pub mod timeline;
pub mod wait;

// Re-exports
pub use crate::core::{
    Generation, Handle, Point, SyncError, SyncResult, WaitCell, WaitSet, BINARY_POINT,
    NULL_HANDLE,
};
pub use engine::{EngineStats, SyncEngine};
pub use fence::{Fence, FenceSlot, SignaledFence, SlotState, SoftwareFence, SoftwareTimeline};
pub use object::{SyncObject, SyncObjectTable, MAX_SYNC_OBJECTS};
pub use timeline::TimelineChain;
pub use wait::{Deadline, WaitCoordinator, WaitMode, WaitRequest};
