// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tl_core::ErrorCode;

#[derive(Default)]
struct CountingClient {
    invalid_usage: Arc<AtomicUsize>,
    invalid_handle: Arc<AtomicUsize>,
    system: Arc<AtomicUsize>,
}

impl ErrorClient for CountingClient {
    fn on_invalid_usage(&mut self, _text: &str, _code: ErrorCode) {
        self.invalid_usage.fetch_add(1, Ordering::SeqCst);
    }

    fn on_invalid_handle(&mut self, _handle: u64, _text: &str) {
        self.invalid_handle.fetch_add(1, Ordering::SeqCst);
    }

    fn on_system_error(&mut self, _code: i64, _origin: &str, _text: &str) {
        self.system.fetch_add(1, Ordering::SeqCst);
    }
}

fn quiet_logger() -> SessionLogger {
    SessionLogger::stdout(Severity::NoLogMsg)
}

#[test]
fn without_client_the_error_is_returned() {
    let logger = quiet_logger();
    let err = SessionError::invalid_usage("bad", ErrorCode::InvalidArgument);
    let result = route_error(&logger, "A_1", None, err);
    match result {
        Err(SessionError::InvalidUsage { text, .. }) => assert_eq!(text, "bad"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn with_client_exactly_one_callback_fires() {
    let logger = quiet_logger();
    let client = CountingClient::default();
    let usage = Arc::clone(&client.invalid_usage);
    let handle = Arc::clone(&client.invalid_handle);
    let system = Arc::clone(&client.system);
    let slot: Mutex<Box<dyn ErrorClient>> = Mutex::new(Box::new(client));

    let result = route_error(
        &logger,
        "A_1",
        Some(&slot),
        SessionError::invalid_usage("bad", ErrorCode::InvalidArgument),
    );
    assert!(result.is_ok());
    assert_eq!(usage.load(Ordering::SeqCst), 1);
    assert_eq!(handle.load(Ordering::SeqCst), 0);
    assert_eq!(system.load(Ordering::SeqCst), 0);

    let result = route_error(
        &logger,
        "A_1",
        Some(&slot),
        SessionError::invalid_handle(7, "gone"),
    );
    assert!(result.is_ok());
    assert_eq!(usage.load(Ordering::SeqCst), 1);
    assert_eq!(handle.load(Ordering::SeqCst), 1);
}
