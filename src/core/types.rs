/*!
 * Core Types
 * Fundamental type definitions used across the engine
 */

use crate::core::errors::SyncError;

/// Synchronization object handle
///
/// Handles are process-scope identifiers allocated from 1 upward; 0 is
/// never allocated and acts as the invalid placeholder value.
pub type Handle = u32;

/// Timeline point
///
/// A caller-chosen index identifying one unit of work on a timeline.
/// Point 0 is reserved for binary-mode compatibility. Comparison is full
/// unsigned 64-bit, independent of whatever width the producing source
/// uses internally.
pub type Point = u64;

/// Chain mutation counter
pub type Generation = u64;

/// Result type for all engine operations
pub type SyncResult<T> = Result<T, SyncError>;

/// The invalid placeholder handle
pub const NULL_HANDLE: Handle = 0;

/// First point of a timeline in binary-compatibility usage
pub const BINARY_POINT: Point = 0;
