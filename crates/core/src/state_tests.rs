// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn advances_through_full_sequence() {
    let mut state = SessionState::NotInitialized;
    for next in [
        SessionState::TransportInitialized,
        SessionState::ReactorInitialized,
        SessionState::LoginStreamOpenPending,
        SessionState::LoginStreamOpenOk,
        SessionState::Operational,
    ] {
        assert!(state.advance(next), "expected advance to {next}");
        assert_eq!(state, next);
    }
}

#[test]
fn never_moves_backward() {
    let mut state = SessionState::LoginStreamOpenOk;
    assert!(!state.advance(SessionState::ReactorInitialized));
    assert!(!state.advance(SessionState::LoginStreamOpenPending));
    assert_eq!(state, SessionState::LoginStreamOpenOk);
}

#[test]
fn rejection_only_from_pending() {
    let mut state = SessionState::ReactorInitialized;
    assert!(!state.advance(SessionState::LoginStreamRejected));

    state = SessionState::LoginStreamOpenPending;
    assert!(state.advance(SessionState::LoginStreamRejected));
    assert!(state.is_login_terminal());
}

#[test]
fn timeout_is_terminal_for_bring_up() {
    let mut state = SessionState::LoginStreamOpenPending;
    assert!(state.advance(SessionState::LoginTimedOut));
    assert!(!state.advance(SessionState::LoginStreamOpenOk));
    assert!(!state.advance(SessionState::Operational));
}

#[test]
fn reset_returns_to_not_initialized() {
    let mut state = SessionState::Operational;
    state.reset();
    assert_eq!(state, SessionState::NotInitialized);
}

#[test]
fn skipping_forward_is_allowed() {
    // Teardown of a partially brought-up session can observe jumps, e.g.
    // a login granted while still draining directory state.
    let mut state = SessionState::ReactorInitialized;
    assert!(state.advance(SessionState::LoginStreamOpenOk));
}
