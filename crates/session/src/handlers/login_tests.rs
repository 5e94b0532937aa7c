// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct Counting {
    refreshes: Arc<Mutex<Vec<Handle>>>,
}

impl SessionClient for Counting {
    fn on_refresh(&mut self, event: &StreamEvent) {
        self.refreshes.lock().push(event.handle);
    }
}

fn granted_event() -> LoginEvent {
    LoginEvent {
        status: LoginStatus::Granted,
        message: StreamMessage::new(1, MessageKind::Refresh, Vec::new()),
    }
}

#[test]
fn granted_advances_state_and_fans_out() {
    let mut handler = LoginHandler::new(LoginRequest::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let handle = handler.register(
        Box::new(Counting {
            refreshes: Arc::clone(&seen),
        }),
        None,
    );

    let mut state = SessionState::LoginStreamOpenPending;
    let (ret, dispatched) = handler.process(&mut state, ChannelId(1), granted_event());

    assert_eq!(ret, CallbackRet::Success);
    assert_eq!(dispatched, 1);
    assert_eq!(state, SessionState::LoginStreamOpenOk);
    assert!(handler.granted());
    assert_eq!(*seen.lock(), vec![handle]);
}

#[test]
fn denial_records_failure_text() {
    let mut handler = LoginHandler::new(LoginRequest::default());
    let mut state = SessionState::LoginStreamOpenPending;
    let event = LoginEvent {
        status: LoginStatus::Denied {
            text: "not entitled".to_string(),
        },
        message: StreamMessage::new(1, MessageKind::Status, Vec::new()),
    };
    handler.process(&mut state, ChannelId(1), event);

    assert_eq!(state, SessionState::LoginStreamRejected);
    assert_eq!(handler.failure_text(), Some("not entitled"));
}

#[test]
fn unregister_removes_stream() {
    let mut handler = LoginHandler::new(LoginRequest::default());
    let handle = handler.register(Box::new(Counting::default()), None);
    assert!(handler.has_streams());
    assert!(handler.owns(handle));
    assert!(handler.unregister(handle));
    assert!(!handler.unregister(handle));
    assert!(!handler.has_streams());
}
