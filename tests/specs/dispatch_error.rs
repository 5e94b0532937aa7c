//! A fatal reactor dispatch error reaches the user exactly once: through
//! the error client when one is registered, otherwise as the returned
//! error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serial_test::serial;
use tl_core::ErrorCode;
use tl_reactor::event::{ChannelId, ItemEvent, MessageKind, ReactorEvent, StreamMessage};
use tl_reactor::stub::StubReactor;
use tl_session::ErrorClient;

use crate::prelude::builder_with;

struct CountingErrorClient {
    invalid_usage: Arc<AtomicUsize>,
    others: Arc<AtomicUsize>,
}

impl ErrorClient for CountingErrorClient {
    fn on_invalid_usage(&mut self, _text: &str, _code: ErrorCode) {
        self.invalid_usage.fetch_add(1, Ordering::SeqCst);
    }

    fn on_system_error(&mut self, _code: i64, _origin: &str, _text: &str) {
        self.others.fetch_add(1, Ordering::SeqCst);
    }
}

fn make_reactor_ready(probe: &StubReactor) {
    probe.push_event(ReactorEvent::Item {
        channel: ChannelId(1),
        event: ItemEvent {
            message: StreamMessage::new(999, MessageKind::Update, Vec::new()),
        },
    });
}

#[test]
#[serial]
fn without_error_client_the_call_returns_the_error_once() {
    let stub = StubReactor::new().unwrap().happy_path();
    let probe = stub.clone();
    let session = builder_with("Prices", stub).initialize().unwrap();

    probe.fail_dispatch_on_call(probe.dispatch_call_count() + 1);
    make_reactor_ready(&probe);

    let err = session.dispatch(100_000).unwrap_err();
    match err.code() {
        Some(ErrorCode::ReactorFailure(code)) => assert_eq!(code, -1),
        other => panic!("unexpected code: {other:?}"),
    }
    assert!(err.to_string().contains("reactor dispatch failed"));

    session.uninitialize();
}

#[test]
#[serial]
fn with_error_client_exactly_one_callback_fires() {
    let stub = StubReactor::new().unwrap().happy_path();
    let probe = stub.clone();

    let invalid_usage = Arc::new(AtomicUsize::new(0));
    let others = Arc::new(AtomicUsize::new(0));
    let session = builder_with("Prices", stub)
        .error_client(Box::new(CountingErrorClient {
            invalid_usage: Arc::clone(&invalid_usage),
            others: Arc::clone(&others),
        }))
        .initialize()
        .unwrap();

    probe.fail_dispatch_on_call(probe.dispatch_call_count() + 1);
    make_reactor_ready(&probe);

    // With a client registered the call itself does not fail.
    session.dispatch(100_000).unwrap();
    assert_eq!(invalid_usage.load(Ordering::SeqCst), 1);
    assert_eq!(others.load(Ordering::SeqCst), 0);

    session.uninitialize();
}
