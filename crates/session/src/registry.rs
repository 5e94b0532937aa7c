// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide session registry.
//!
//! Every session registers here at bring-up, producing the numeric id used
//! in its instance name. The transport library stays initialized while the
//! registry is non-empty. A dedicated cleanup lock serializes teardown
//! against an exit handler running in another thread.

use parking_lot::{Mutex, MutexGuard};

struct RegistryState {
    next_id: u64,
    active: Vec<u64>,
}

static REGISTRY: Mutex<RegistryState> = Mutex::new(RegistryState {
    next_id: 0,
    active: Vec::new(),
});

static CLEANUP: Mutex<()> = Mutex::new(());

/// Register a new session; returns its process-unique id (starting at 1).
pub(crate) fn register() -> u64 {
    let mut state = REGISTRY.lock();
    state.next_id += 1;
    let id = state.next_id;
    state.active.push(id);
    id
}

/// Remove a session; returns whether it was still registered.
pub(crate) fn remove(id: u64) -> bool {
    let mut state = REGISTRY.lock();
    match state.active.iter().position(|&v| v == id) {
        Some(pos) => {
            state.active.remove(pos);
            true
        }
        None => false,
    }
}

pub(crate) fn contains(id: u64) -> bool {
    REGISTRY.lock().active.contains(&id)
}

/// Number of live sessions in the process.
pub fn active_sessions() -> usize {
    REGISTRY.lock().active.len()
}

/// Serialize teardown against concurrent cleanup.
pub(crate) fn acquire_cleanup() -> MutexGuard<'static, ()> {
    CLEANUP.lock()
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
