/*!
 * Object Module
 * Sync objects and the process-wide handle table
 */

pub mod object;
pub mod table;

// Re-export public API
pub use object::SyncObject;
pub use table::{SyncObjectTable, MAX_SYNC_OBJECTS};
