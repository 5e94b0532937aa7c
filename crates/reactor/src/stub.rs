// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable in-process reactor for tests.
//!
//! The stub owns an anonymous pipe as its event descriptor: one byte sits
//! in the pipe whenever events are queued, so a readiness wait on the
//! registered end wakes exactly like it would for a real reactor. Tests
//! keep a clone of the stub as a probe and script behavior through it.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::Arc;

use mio::unix::pipe;
use mio::{Interest, Registry, Token};
use parking_lot::Mutex;

use crate::event::{
    ChannelEvent, ChannelEventKind, ChannelId, DictionaryEvent, DirectoryEvent,
    DirectoryEventKind, LoginEvent, LoginStatus, MessageKind, OAuthCredential, ReactorEvent,
    ServiceInfo, StreamMessage,
};
use crate::{
    CallbackRet, ChannelInformation, ChannelOpenRequest, ChannelStatistics, ConverterOptions,
    DispatchOpts, DispatchOutcome, EventSink, Reactor, ReactorError,
};

struct StubInner {
    wake_tx: pipe::Sender,
    wake_rx: pipe::Receiver,
    byte_in_pipe: bool,
    queue: VecDeque<ReactorEvent>,

    dispatch_calls: usize,
    fail_on_call: Option<usize>,

    grant_login: bool,
    services: Vec<ServiceInfo>,
    supply_dictionary: bool,

    next_channel: u64,
    opened: Vec<ChannelOpenRequest>,
    closed: Vec<ChannelId>,
    submitted: Vec<(ChannelId, StreamMessage)>,
    credentials: Vec<OAuthCredential>,
    ioctls: Vec<(i32, i32)>,
    converter: Option<ConverterOptions>,
}

impl StubInner {
    fn ensure_byte(&mut self) {
        if !self.byte_in_pipe {
            let _ = (&self.wake_tx).write(&[0u8]);
            self.byte_in_pipe = true;
        }
    }

    fn drain_byte(&mut self) {
        if self.byte_in_pipe {
            let mut buf = [0u8; 1];
            let _ = (&self.wake_rx).read(&mut buf);
            self.byte_in_pipe = false;
        }
    }
}

/// Scriptable reactor double. Cloning yields a probe sharing the same
/// state, so tests can inspect calls after handing the stub to a session.
#[derive(Clone)]
pub struct StubReactor {
    inner: Arc<Mutex<StubInner>>,
}

impl StubReactor {
    pub fn new() -> io::Result<Self> {
        let (wake_tx, wake_rx) = pipe::new()?;
        Ok(Self {
            inner: Arc::new(Mutex::new(StubInner {
                wake_tx,
                wake_rx,
                byte_in_pipe: false,
                queue: VecDeque::new(),
                dispatch_calls: 0,
                fail_on_call: None,
                grant_login: false,
                services: Vec::new(),
                supply_dictionary: false,
                next_channel: 0,
                opened: Vec::new(),
                closed: Vec::new(),
                submitted: Vec::new(),
                credentials: Vec::new(),
                ioctls: Vec::new(),
                converter: None,
            })),
        })
    }

    /// Script a successful bring-up: every connect is answered with channel
    /// up, login granted, a directory refresh, and a complete dictionary.
    pub fn happy_path(self) -> Self {
        {
            let mut inner = self.inner.lock();
            inner.grant_login = true;
            inner.supply_dictionary = true;
            inner.services = vec![ServiceInfo {
                id: 1,
                name: "FEED".to_string(),
            }];
        }
        self
    }

    /// Advertise `services` on the scripted directory refresh.
    pub fn with_services(self, services: Vec<ServiceInfo>) -> Self {
        self.inner.lock().services = services;
        self
    }

    /// Make the `n`-th dispatch call (1-based) return a reactor error.
    pub fn fail_dispatch_on_call(&self, n: usize) {
        self.inner.lock().fail_on_call = Some(n);
    }

    /// Queue an event for the next dispatch and raise the event descriptor.
    pub fn push_event(&self, event: ReactorEvent) {
        let mut inner = self.inner.lock();
        inner.queue.push_back(event);
        inner.ensure_byte();
    }

    pub fn dispatch_call_count(&self) -> usize {
        self.inner.lock().dispatch_calls
    }

    pub fn opened_requests(&self) -> Vec<ChannelOpenRequest> {
        self.inner.lock().opened.clone()
    }

    pub fn closed_channels(&self) -> Vec<ChannelId> {
        self.inner.lock().closed.clone()
    }

    pub fn submitted_messages(&self) -> Vec<(ChannelId, StreamMessage)> {
        self.inner.lock().submitted.clone()
    }

    pub fn submitted_credentials(&self) -> Vec<OAuthCredential> {
        self.inner.lock().credentials.clone()
    }

    pub fn ioctl_calls(&self) -> Vec<(i32, i32)> {
        self.inner.lock().ioctls.clone()
    }

    pub fn converter_options(&self) -> Option<ConverterOptions> {
        self.inner.lock().converter.clone()
    }

    fn deliver(sink: &mut dyn EventSink, event: ReactorEvent) -> CallbackRet {
        match event {
            ReactorEvent::Channel(event) => sink.on_channel_event(event),
            ReactorEvent::Login { channel, event } => sink.on_login_event(channel, event),
            ReactorEvent::Directory { channel, event } => sink.on_directory_event(channel, event),
            ReactorEvent::Dictionary { channel, event } => {
                sink.on_dictionary_event(channel, event)
            }
            ReactorEvent::Item { channel, event } => sink.on_item_event(channel, event),
            ReactorEvent::OAuthRenewal(event) => sink.on_oauth_renewal(event),
            ReactorEvent::JsonConversionError(event) => sink.on_json_conversion_error(event),
            ReactorEvent::RestLog(event) => sink.on_rest_log(event),
        }
    }
}

impl Reactor for StubReactor {
    fn register_event_source(&mut self, registry: &Registry, token: Token) -> io::Result<()> {
        let mut inner = self.inner.lock();
        registry.register(&mut inner.wake_rx, token, Interest::READABLE)
    }

    fn deregister_event_source(&mut self, registry: &Registry) -> io::Result<()> {
        let mut inner = self.inner.lock();
        registry.deregister(&mut inner.wake_rx)
    }

    fn dispatch(
        &mut self,
        opts: &DispatchOpts,
        sink: &mut dyn EventSink,
    ) -> Result<DispatchOutcome, ReactorError> {
        let call = {
            let mut inner = self.inner.lock();
            inner.dispatch_calls += 1;
            inner.dispatch_calls
        };
        if self.inner.lock().fail_on_call == Some(call) {
            return Err(ReactorError::new(
                -1,
                "StubReactor::dispatch",
                "scripted dispatch failure",
            ));
        }

        let mut delivered = 0;
        while delivered < opts.max_messages {
            // Pop outside the sink call so callbacks may use probe handles.
            let Some(event) = self.inner.lock().queue.pop_front() else {
                break;
            };
            delivered += 1;
            if Self::deliver(sink, event) == CallbackRet::Failure {
                return Err(ReactorError::new(
                    -1,
                    "StubReactor::dispatch",
                    "event sink reported failure",
                ));
            }
        }

        let mut inner = self.inner.lock();
        if inner.queue.is_empty() {
            inner.drain_byte();
            Ok(DispatchOutcome::Done)
        } else {
            Ok(DispatchOutcome::MorePending)
        }
    }

    fn connect(&mut self, request: ChannelOpenRequest) -> Result<ChannelId, ReactorError> {
        let mut inner = self.inner.lock();
        inner.next_channel += 1;
        let channel = ChannelId(inner.next_channel);
        inner.opened.push(request);

        inner.queue.push_back(ReactorEvent::Channel(ChannelEvent {
            channel,
            kind: ChannelEventKind::Opened,
            socket: None,
        }));
        inner.queue.push_back(ReactorEvent::Channel(ChannelEvent {
            channel,
            kind: ChannelEventKind::Up,
            socket: None,
        }));
        if inner.grant_login {
            inner.queue.push_back(ReactorEvent::Login {
                channel,
                event: LoginEvent {
                    status: LoginStatus::Granted,
                    message: StreamMessage::new(1, MessageKind::Refresh, Vec::new()),
                },
            });
            let services = inner.services.clone();
            inner.queue.push_back(ReactorEvent::Directory {
                channel,
                event: DirectoryEvent {
                    kind: DirectoryEventKind::Refresh,
                    services,
                    message: StreamMessage::new(2, MessageKind::Refresh, Vec::new()),
                },
            });
            if inner.supply_dictionary {
                inner.queue.push_back(ReactorEvent::Dictionary {
                    channel,
                    event: DictionaryEvent {
                        name: "RWFFld".to_string(),
                        complete: true,
                        message: StreamMessage::new(3, MessageKind::Refresh, Vec::new()),
                    },
                });
            }
            inner.queue.push_back(ReactorEvent::Channel(ChannelEvent {
                channel,
                kind: ChannelEventKind::Ready,
                socket: None,
            }));
        }
        inner.ensure_byte();
        Ok(channel)
    }

    fn close_channel(&mut self, channel: ChannelId) -> Result<(), ReactorError> {
        self.inner.lock().closed.push(channel);
        Ok(())
    }

    fn init_json_converter(&mut self, options: &ConverterOptions) -> Result<(), ReactorError> {
        self.inner.lock().converter = Some(options.clone());
        Ok(())
    }

    fn submit(&mut self, channel: ChannelId, message: StreamMessage) -> Result<(), ReactorError> {
        self.inner.lock().submitted.push((channel, message));
        Ok(())
    }

    fn submit_oauth_credentials(
        &mut self,
        credential: &OAuthCredential,
    ) -> Result<(), ReactorError> {
        self.inner.lock().credentials.push(credential.clone());
        Ok(())
    }

    fn ioctl(&mut self, code: i32, value: i32) -> Result<(), ReactorError> {
        self.inner.lock().ioctls.push((code, value));
        Ok(())
    }

    fn channel_information(&self, channel: ChannelId) -> Result<ChannelInformation, ReactorError> {
        let inner = self.inner.lock();
        let request = inner
            .opened
            .get((channel.0 as usize).saturating_sub(1))
            .ok_or_else(|| {
                ReactorError::new(-1, "StubReactor::channel_information", "unknown channel")
            })?;
        let socket = request.channel.socket_config();
        Ok(ChannelInformation {
            name: request.channel.name.clone(),
            hostname: socket.map(|s| s.host.clone()).unwrap_or_default(),
            port: socket.map(|s| s.service.clone()).unwrap_or_default(),
            component_info: "stub-reactor".to_string(),
            channel_state: "active".to_string(),
        })
    }

    fn channel_statistics(&self, channel: ChannelId) -> Result<ChannelStatistics, ReactorError> {
        let inner = self.inner.lock();
        if (channel.0 as usize) > inner.opened.len() {
            return Err(ReactorError::new(
                -1,
                "StubReactor::channel_statistics",
                "unknown channel",
            ));
        }
        Ok(ChannelStatistics::default())
    }
}

#[cfg(test)]
#[path = "stub_tests.rs"]
mod tests;
