// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-global transport library initialization.
//!
//! The transport layer is initialized once per process and reference
//! counted: each session bring-up increments the count, each teardown
//! decrements it, and the underlying library is only torn down when the
//! count reaches zero.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::ReactorError;

static ACTIVE: AtomicU64 = AtomicU64::new(0);

/// Options for transport initialization.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Lock both the global transport state and individual channels.
    pub global_and_channel_locking: bool,
    /// Just-in-time loaded crypto/transport library names, when overridden.
    pub lib_ssl_name: Option<String>,
    pub lib_crypto_name: Option<String>,
    pub lib_curl_name: Option<String>,
}

/// Initialize the transport library (idempotent past the first call).
pub fn initialize(options: &TransportOptions) -> Result<(), ReactorError> {
    let previous = ACTIVE.fetch_add(1, Ordering::SeqCst);
    if previous == 0 {
        debug!(
            locking = options.global_and_channel_locking,
            ssl = options.lib_ssl_name.as_deref().unwrap_or("default"),
            "transport library initialized"
        );
    }
    Ok(())
}

/// Release one reference to the transport library.
pub fn uninitialize() -> Result<(), ReactorError> {
    let previous = ACTIVE.fetch_sub(1, Ordering::SeqCst);
    match previous {
        0 => {
            // Underflow: restore and report.
            ACTIVE.fetch_add(1, Ordering::SeqCst);
            warn!("transport uninitialize without matching initialize");
            Err(ReactorError::new(
                -1,
                "transport::uninitialize",
                "transport library was not initialized",
            ))
        }
        1 => {
            debug!("transport library uninitialized");
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Number of sessions currently holding the transport library open.
pub fn active_count() -> u64 {
    ACTIVE.load(Ordering::SeqCst)
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
