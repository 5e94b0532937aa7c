//! Re-entrant credential submission during the OAuth renewal callback.

use std::sync::Arc;

use parking_lot::Mutex;
use serial_test::serial;
use tl_core::ErrorCode;
use tl_reactor::event::{OAuthCredential, OAuthRenewalEvent, ReactorEvent};
use tl_reactor::stub::StubReactor;
use tl_session::{CredentialsPort, OAuthClient, RenewalEvent};

use crate::prelude::builder_with;

/// Client that hands fresh credentials back from inside the callback.
struct RenewingClient {
    port: Arc<Mutex<Option<CredentialsPort>>>,
    outcomes: Arc<Mutex<Vec<bool>>>,
}

impl OAuthClient for RenewingClient {
    fn on_credential_renewal(&mut self, _event: &RenewalEvent) {
        let port = self.port.lock().clone();
        if let Some(port) = port {
            let accepted = port
                .submit(OAuthCredential {
                    client_id: "svc-account".to_string(),
                    client_secret: "rotated-secret".to_string(),
                    token_scope: String::new(),
                })
                .is_ok();
            self.outcomes.lock().push(accepted);
        }
    }
}

#[test]
#[serial]
fn renewal_callback_accepts_credentials_without_deadlock() {
    let stub = StubReactor::new().unwrap().happy_path();
    let probe = stub.clone();

    let port_slot = Arc::new(Mutex::new(None));
    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let client = RenewingClient {
        port: Arc::clone(&port_slot),
        outcomes: Arc::clone(&outcomes),
    };

    let session = builder_with("Prices", stub)
        .oauth(
            Box::new(client),
            OAuthCredential {
                client_id: "svc-account".to_string(),
                client_secret: "initial-secret".to_string(),
                token_scope: String::new(),
            },
        )
        .initialize()
        .unwrap();
    *port_slot.lock() = Some(session.credentials_port());

    probe.push_event(ReactorEvent::OAuthRenewal(OAuthRenewalEvent { channel: None }));
    session.dispatch(100_000).unwrap();

    // The callback ran, the submission was accepted, and the renewed
    // credential reached the reactor after the callback returned.
    assert_eq!(*outcomes.lock(), vec![true]);
    let submitted = probe.submitted_credentials();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].client_secret, "rotated-secret");

    // The in-callback marker is cleared once the callback returns.
    assert!(!session.in_oauth_callback());

    session.uninitialize();
}

#[test]
#[serial]
fn submission_outside_the_callback_is_rejected() {
    let stub = StubReactor::new().unwrap().happy_path();
    let session = builder_with("Prices", stub)
        .initialize()
        .unwrap();

    let err = session
        .submit_oauth_credentials(OAuthCredential::default())
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::InvalidOperation));

    session.uninitialize();
}
