/*!
 * Wait Types
 * Request, mode, and deadline types for blocking waits
 */

use crate::core::types::{Handle, Point, BINARY_POINT};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Combination mode over a request's entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitMode {
    /// Success as soon as one entry is satisfied
    Any,
    /// Success once every entry is satisfied
    All,
}

/// Absolute wait deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Single poll, no suspension
    NoWait,
    /// Block until the instant passes
    At(Instant),
    /// Block until satisfied
    Forever,
}

impl Deadline {
    /// Deadline `timeout` from now. Saturates to `Forever` if the instant
    /// is unrepresentable.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Instant::now()
            .checked_add(timeout)
            .map_or(Deadline::Forever, Deadline::At)
    }
}

/// One blocking wait over a list of `(handle, point)` entries.
///
/// Duplicates are allowed and evaluated independently. The default gate
/// requires each entry's captured fence to signal; `until_available`
/// relaxes it to "a fence exists", and `for_submit` permits entries that
/// are still unbound at snapshot time, blocking until something binds.
/// The default deadline blocks forever.
#[derive(Debug, Clone)]
pub struct WaitRequest {
    entries: Vec<(Handle, Point)>,
    mode: WaitMode,
    wait_for_submit: bool,
    wait_available: bool,
    deadline: Deadline,
}

impl WaitRequest {
    #[must_use]
    pub fn new(entries: &[(Handle, Point)], mode: WaitMode) -> Self {
        Self {
            entries: entries.to_vec(),
            mode,
            wait_for_submit: false,
            wait_available: false,
            deadline: Deadline::Forever,
        }
    }

    /// Request satisfied by the first signaled entry.
    #[must_use]
    pub fn any(entries: &[(Handle, Point)]) -> Self {
        Self::new(entries, WaitMode::Any)
    }

    /// Request satisfied once every entry is signaled.
    #[must_use]
    pub fn all(entries: &[(Handle, Point)]) -> Self {
        Self::new(entries, WaitMode::All)
    }

    /// Binary-mode request: every entry at point 0.
    #[must_use]
    pub fn binary(handles: &[Handle], mode: WaitMode) -> Self {
        let entries: Vec<(Handle, Point)> = handles
            .iter()
            .map(|&handle| (handle, BINARY_POINT))
            .collect();
        Self::new(&entries, mode)
    }

    /// Permit unbound entries; block until a fence binds there.
    #[must_use]
    pub fn for_submit(mut self) -> Self {
        self.wait_for_submit = true;
        self
    }

    /// Relax the gate: an entry is satisfied once a fence exists at its
    /// point, whether or not it has fired.
    #[must_use]
    pub fn until_available(mut self) -> Self {
        self.wait_available = true;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[(Handle, Point)] {
        &self.entries
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> WaitMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn wait_for_submit(&self) -> bool {
        self.wait_for_submit
    }

    #[inline]
    #[must_use]
    pub fn wait_available(&self) -> bool {
        self.wait_available
    }

    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }
}
