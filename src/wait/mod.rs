/*!
 * Wait Module
 * Blocking multi-object, multi-point waits with snapshot isolation
 */

pub mod coordinator;
pub mod types;

// Re-export public API
pub use coordinator::WaitCoordinator;
pub use types::{Deadline, WaitMode, WaitRequest};
