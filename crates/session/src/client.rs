// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing callback traits.
//!
//! All callbacks run on the dispatching thread while the session's user
//! lock is held; implementations may call back into the session only
//! through the operations documented as re-entrant (credential
//! submission during renewal).

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use tl_core::{ErrorCode, Handle};
use tl_reactor::event::{ChannelId, StreamMessage};

/// Opaque user tag attached to a registration and echoed on every event.
pub type ClientClosure = Arc<dyn Any + Send + Sync>;

/// Event delivered to a stream client.
#[derive(Clone)]
pub struct StreamEvent {
    pub handle: Handle,
    pub closure: Option<ClientClosure>,
    pub channel: Option<ChannelId>,
    pub message: StreamMessage,
}

/// Receiver for stream messages. Implement only the kinds of interest.
#[allow(unused_variables)]
pub trait SessionClient: Send {
    fn on_refresh(&mut self, event: &StreamEvent) {}
    fn on_update(&mut self, event: &StreamEvent) {}
    fn on_status(&mut self, event: &StreamEvent) {}
    fn on_generic(&mut self, event: &StreamEvent) {}
    fn on_ack(&mut self, event: &StreamEvent) {}
}

/// Event handed to the OAuth client when the reactor needs fresh
/// credentials.
#[derive(Clone)]
pub struct RenewalEvent {
    pub channel: Option<ChannelId>,
    pub closure: Option<ClientClosure>,
}

/// Receiver for OAuth credential renewal requests.
pub trait OAuthClient: Send {
    fn on_credential_renewal(&mut self, event: &RenewalEvent);
}

/// One REST interaction log message.
#[derive(Clone)]
pub struct RestLogMessage {
    pub message: String,
    pub closure: Option<ClientClosure>,
}

/// Receiver for reactor REST log lines.
pub trait RestLogClient: Send {
    fn on_rest_log(&mut self, event: &RestLogMessage);
}

/// Receiver for asynchronous error delivery. When registered, errors are
/// delivered here instead of being returned from the observing call.
#[allow(unused_variables)]
pub trait ErrorClient: Send {
    fn on_invalid_usage(&mut self, text: &str, code: ErrorCode) {}
    fn on_invalid_handle(&mut self, handle: u64, text: &str) {}
    fn on_memory_exhaustion(&mut self, text: &str) {}
    fn on_json_converter(
        &mut self,
        text: &str,
        code: i32,
        channel: Option<ChannelId>,
        provider: bool,
    ) {
    }
    fn on_system_error(&mut self, code: i64, origin: &str, text: &str) {}
    fn on_inaccessible_log_file(&mut self, filename: &Path, text: &str) {}
}
