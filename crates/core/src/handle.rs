// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque stream handles returned to users on registration.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide allocator state. Handle 0 is reserved as invalid.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a registered stream.
///
/// Handles are unique across all sessions in the process and strictly
/// increasing; they are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Sentinel returned when registration was routed to an error client
    /// instead of producing a live stream.
    pub const INVALID: Handle = Handle(0);

    /// Allocate the next process-wide handle.
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
