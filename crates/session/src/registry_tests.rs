// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ids_are_unique_and_removal_is_tracked() {
    let a = register();
    let b = register();
    assert_ne!(a, b);
    assert!(contains(a));
    assert!(contains(b));

    assert!(remove(a));
    assert!(!contains(a));
    // Double removal reports absence.
    assert!(!remove(a));
    assert!(remove(b));
}

#[test]
fn cleanup_lock_is_exclusive() {
    let guard = acquire_cleanup();
    assert!(CLEANUP.try_lock().is_none());
    drop(guard);
    assert!(CLEANUP.try_lock().is_some());
}
