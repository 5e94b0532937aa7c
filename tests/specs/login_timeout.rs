//! Bring-up fails with a login timeout when the upstream never answers.

use serial_test::serial;
use tl_config::{CallOverrides, ConfigStore};
use tl_core::ErrorCode;
use tl_reactor::stub::StubReactor;
use tl_reactor::Reactor;
use tl_session::{active_sessions, SessionBuilder};

use crate::prelude::quiet_logger;

#[test]
#[serial]
fn login_watchdog_fails_bring_up() {
    let sessions_before = active_sessions();

    // A stub that accepts the connect but never grants login plays the
    // black-hole endpoint.
    let silent = StubReactor::new().unwrap();
    let store = ConfigStore::with_file_text(
        r#"
[SessionGroup.SessionList.Prices]
LoginRequestTimeOut = 500
"#,
    )
    .unwrap();
    let overrides = CallOverrides {
        host: Some("blackhole.example.com".to_string()),
        port: Some("24002".to_string()),
        ..CallOverrides::default()
    };

    let started = std::time::Instant::now();
    let err = SessionBuilder::new("Prices")
        .config_store(store)
        .overrides(overrides)
        .logger(quiet_logger())
        .reactor_factory(move |_options| Ok(Box::new(silent) as Box<dyn Reactor>))
        .initialize()
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::LoginRequestTimeout));
    let text = err.to_string();
    assert!(text.contains("500 milliseconds"), "text: {text}");
    assert!(text.contains("blackhole.example.com:24002"), "text: {text}");

    // The watchdog fired close to its deadline, not after some larger
    // internal timeout.
    assert!(started.elapsed() < std::time::Duration::from_secs(5));

    // Nothing leaked: the session map is back to its prior size and no
    // dispatch thread was started for the failed session.
    assert_eq!(active_sessions(), sessions_before);
}

#[test]
#[serial]
fn zero_timeout_disables_the_watchdog() {
    // With the watchdog disabled, a rejected login must still fail
    // bring-up on its own; only a silent upstream may block.
    let stub = StubReactor::new().unwrap();
    let probe = stub.clone();
    let store = ConfigStore::with_file_text(
        r#"
[SessionGroup.SessionList.Prices]
LoginRequestTimeOut = 0
"#,
    )
    .unwrap();

    // Deny the login as soon as the channel connects.
    let handle = std::thread::spawn(move || {
        // Wait until the connect recorded the open request, then deny.
        while probe.opened_requests().is_empty() {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        probe.push_event(tl_reactor::event::ReactorEvent::Login {
            channel: tl_reactor::event::ChannelId(1),
            event: tl_reactor::event::LoginEvent {
                status: tl_reactor::event::LoginStatus::Denied {
                    text: "not entitled".to_string(),
                },
                message: tl_reactor::event::StreamMessage::new(
                    1,
                    tl_reactor::event::MessageKind::Status,
                    Vec::new(),
                ),
            },
        });
    });

    let err = SessionBuilder::new("Prices")
        .config_store(store)
        .logger(quiet_logger())
        .reactor_factory(move |_options| Ok(Box::new(stub) as Box<dyn Reactor>))
        .initialize()
        .unwrap_err();
    handle.join().unwrap();

    assert_eq!(err.code(), Some(ErrorCode::LoginRequestRejected));
    assert!(err.to_string().contains("not entitled"));
}
