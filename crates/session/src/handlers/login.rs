// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Login stream handler.
//!
//! Tracks the session-level login exchange and fans login stream events
//! out to registered login clients (the admin client among them).

use tl_core::{Handle, SessionState};
use tl_reactor::event::{ChannelId, LoginEvent, LoginStatus, MessageKind, StreamMessage};
use tl_reactor::{CallbackRet, LoginRequest, Reactor};
use tracing::debug;

use crate::client::{ClientClosure, SessionClient, StreamEvent};
use crate::handlers::deliver;

/// Login stream id on the wire.
const LOGIN_STREAM_ID: i32 = 1;

struct LoginStream {
    handle: Handle,
    client: Box<dyn SessionClient>,
    closure: Option<ClientClosure>,
}

pub(crate) struct LoginHandler {
    request: LoginRequest,
    streams: Vec<LoginStream>,
    failure_text: Option<String>,
    granted: bool,
}

impl LoginHandler {
    pub fn new(request: LoginRequest) -> Self {
        Self {
            request,
            streams: Vec::new(),
            failure_text: None,
            granted: false,
        }
    }

    pub fn login_request(&self) -> &LoginRequest {
        &self.request
    }

    /// Register a client for login stream events.
    pub fn register(
        &mut self,
        client: Box<dyn SessionClient>,
        closure: Option<ClientClosure>,
    ) -> Handle {
        let handle = Handle::next();
        self.streams.push(LoginStream {
            handle,
            client,
            closure,
        });
        handle
    }

    /// Remove a registered login stream; returns whether it existed.
    pub fn unregister(&mut self, handle: Handle) -> bool {
        let before = self.streams.len();
        self.streams.retain(|s| s.handle != handle);
        self.streams.len() != before
    }

    pub fn owns(&self, handle: Handle) -> bool {
        self.streams.iter().any(|s| s.handle == handle)
    }

    pub fn has_streams(&self) -> bool {
        !self.streams.is_empty()
    }

    pub fn granted(&self) -> bool {
        self.granted
    }

    /// Message carried by the login denial, when one arrived.
    pub fn failure_text(&self) -> Option<&str> {
        self.failure_text.as_deref()
    }

    /// Process a login stream event. Returns the callback sentinel and the
    /// number of user callbacks invoked.
    pub fn process(
        &mut self,
        state: &mut SessionState,
        channel: ChannelId,
        event: LoginEvent,
    ) -> (CallbackRet, usize) {
        match &event.status {
            LoginStatus::Granted => {
                self.granted = true;
                state.advance(SessionState::LoginStreamOpenOk);
                debug!(%channel, "login stream open");
            }
            LoginStatus::Denied { text } => {
                self.failure_text = Some(text.clone());
                state.advance(SessionState::LoginStreamRejected);
                debug!(%channel, text, "login stream rejected");
            }
            LoginStatus::Other => {}
        }

        let mut dispatched = 0;
        for stream in &mut self.streams {
            let stream_event = StreamEvent {
                handle: stream.handle,
                closure: stream.closure.clone(),
                channel: Some(channel),
                message: event.message.clone(),
            };
            deliver(stream.client.as_mut(), &stream_event);
            dispatched += 1;
        }
        (CallbackRet::Success, dispatched)
    }

    /// Queue a login close on every given channel; returns how many close
    /// messages were handed to the reactor.
    pub fn send_close(&mut self, reactor: &mut dyn Reactor, channels: &[ChannelId]) -> u32 {
        let mut sent = 0;
        for &channel in channels {
            let close = StreamMessage::new(LOGIN_STREAM_ID, MessageKind::Close, Vec::new());
            if reactor.submit(channel, close).is_ok() {
                sent += 1;
            }
        }
        sent
    }

    /// Drop all registered login streams.
    pub fn clear(&mut self) {
        self.streams.clear();
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
