/*!
 * Error Types
 * Unified error taxonomy with thiserror, miette, and serde support
 */

use crate::core::types::{Handle, Point};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified engine error type with miette diagnostics
///
/// Every failure is reported as a value; the engine never panics on
/// caller-supplied handles or points.
#[derive(Error, Debug, Clone, Serialize, Deserialize, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum SyncError {
    /// Unknown object handle
    #[error("unknown sync object handle: {0}")]
    #[diagnostic(
        code(syncpoint::invalid_handle),
        help("The handle does not name a live sync object. It may have been destroyed or never created.")
    )]
    InvalidHandle(Handle),

    /// Placeholder handle or absent sub-resource
    #[error("sync resource not found: {0}")]
    #[diagnostic(
        code(syncpoint::not_found),
        help("A null placeholder handle (0) or an absent sub-resource was referenced where one must exist.")
    )]
    NotFound(String),

    /// Re-binding a live slot without reset
    #[error("point {point} already carries a live fence")]
    #[diagnostic(
        code(syncpoint::already_bound),
        help("A Pending or Signaled slot cannot be re-bound. Reset the point first.")
    )]
    AlreadyBound { point: Point },

    /// Malformed request
    #[error("invalid argument: {0}")]
    #[diagnostic(
        code(syncpoint::invalid_argument),
        help("The request is malformed: empty handle arrays, mismatched array lengths, or a wait on an unbound point without submit-blocking.")
    )]
    InvalidArgument(String),

    /// Wait deadline elapsed
    #[error("wait timed out after {elapsed_ms}ms (budget: {timeout_ms}ms)")]
    #[diagnostic(
        code(syncpoint::timed_out),
        help("The wait condition was not satisfied before the deadline. Check that the expected producer actually signals the point.")
    )]
    TimedOut { elapsed_ms: u64, timeout_ms: u64 },

    /// Too many live objects
    #[error("sync object limit exceeded: {0}")]
    #[diagnostic(
        code(syncpoint::limit_exceeded),
        help("The engine's live-object cap was reached. Destroy unused objects.")
    )]
    LimitExceeded(String),

    /// Wait abandoned before producing an outcome
    #[error("wait cancelled: {0}")]
    #[diagnostic(
        code(syncpoint::cancelled),
        help("The task carrying the wait was cancelled or panicked before the wait resolved.")
    )]
    Cancelled(String),
}

impl SyncError {
    /// True if this error is the wait-deadline outcome
    #[inline]
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, SyncError::TimedOut { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_classification() {
        let err = SyncError::TimedOut {
            elapsed_ms: 10,
            timeout_ms: 10,
        };
        assert!(err.is_timeout());
        assert!(!SyncError::InvalidHandle(7).is_timeout());
    }

    #[test]
    fn display_carries_context() {
        let err = SyncError::AlreadyBound { point: 42 };
        assert!(err.to_string().contains("42"));
    }
}
