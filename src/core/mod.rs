/*!
 * Core Module
 * Fundamental engine types, error handling, and blocking primitives
 */

pub mod errors;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use errors::SyncError;
pub use sync::{WaitCell, WaitSet};
pub use types::*;
