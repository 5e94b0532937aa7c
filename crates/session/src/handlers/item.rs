// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Item stream handler.
//!
//! Owns the handle -> stream map for user-registered market-data streams
//! and routes inbound item events to their clients.

use std::collections::HashMap;

use tl_core::{ErrorCode, Handle, SessionError};
use tl_reactor::event::{ChannelId, ItemEvent, MessageKind, StreamMessage};
use tl_reactor::{CallbackRet, Reactor};
use tracing::warn;

use crate::client::{ClientClosure, SessionClient, StreamEvent};
use crate::handlers::deliver;
use crate::request::StreamRequest;

/// First stream id handed to user item streams; lower ids carry the admin
/// domains.
const ITEM_STREAM_ID_BASE: i32 = 5;

struct ItemStream {
    handle: Handle,
    stream_id: i32,
    client: Box<dyn SessionClient>,
    closure: Option<ClientClosure>,
    #[allow(dead_code)]
    parent: Option<Handle>,
}

pub(crate) struct ItemHandler {
    streams: HashMap<u64, ItemStream>,
    by_stream_id: HashMap<i32, u64>,
    next_stream_id: i32,
}

impl ItemHandler {
    pub fn new(item_count_hint: u32) -> Self {
        let capacity = usize::try_from(item_count_hint).unwrap_or(0).min(65_536);
        Self {
            streams: HashMap::with_capacity(capacity),
            by_stream_id: HashMap::with_capacity(capacity),
            next_stream_id: ITEM_STREAM_ID_BASE,
        }
    }

    pub fn open_stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn owns(&self, handle: Handle) -> bool {
        self.streams.contains_key(&handle.as_u64())
    }

    /// Open a new item stream: submit the encoded request on the active
    /// channel and record the mapping.
    pub fn register(
        &mut self,
        reactor: &mut dyn Reactor,
        channel: Option<ChannelId>,
        request: &StreamRequest,
        client: Box<dyn SessionClient>,
        closure: Option<ClientClosure>,
        parent: Option<Handle>,
    ) -> Result<Handle, SessionError> {
        let channel = channel.ok_or_else(|| {
            SessionError::invalid_usage(
                "no active channel to open an item stream on",
                ErrorCode::InvalidOperation,
            )
        })?;

        let handle = Handle::next();
        self.next_stream_id += 1;
        let stream_id = self.next_stream_id;

        let message = StreamMessage::new(stream_id, MessageKind::Request, request.payload.clone());
        reactor.submit(channel, message).map_err(|e| {
            SessionError::invalid_usage(
                format!("failed to open item stream for [{}]: {e}", request.name),
                ErrorCode::ReactorFailure(e.code),
            )
        })?;

        self.streams.insert(
            handle.as_u64(),
            ItemStream {
                handle,
                stream_id,
                client,
                closure,
                parent,
            },
        );
        self.by_stream_id.insert(stream_id, handle.as_u64());
        Ok(handle)
    }

    /// Re-issue a request on an existing stream.
    pub fn reissue(
        &mut self,
        reactor: &mut dyn Reactor,
        channel: Option<ChannelId>,
        request: &StreamRequest,
        handle: Handle,
    ) -> Result<(), SessionError> {
        let stream_id = self
            .streams
            .get(&handle.as_u64())
            .map(|s| s.stream_id)
            .ok_or_else(|| {
                SessionError::invalid_handle(handle.as_u64(), "attempt to reissue an unregistered handle")
            })?;
        let channel = active_channel(channel)?;
        let message = StreamMessage::new(stream_id, MessageKind::Request, request.payload.clone());
        reactor.submit(channel, message).map_err(reactor_failure)
    }

    /// Close an item stream and forget its handle.
    pub fn unregister(
        &mut self,
        reactor: &mut dyn Reactor,
        channel: Option<ChannelId>,
        handle: Handle,
    ) -> Result<(), SessionError> {
        let stream = self.streams.remove(&handle.as_u64()).ok_or_else(|| {
            SessionError::invalid_handle(handle.as_u64(), "attempt to unregister an unregistered handle")
        })?;
        self.by_stream_id.remove(&stream.stream_id);

        let channel = active_channel(channel)?;
        let close = StreamMessage::new(stream.stream_id, MessageKind::Close, Vec::new());
        reactor.submit(channel, close).map_err(reactor_failure)
    }

    /// Submit a generic or post message on an open stream.
    pub fn submit(
        &mut self,
        reactor: &mut dyn Reactor,
        channel: Option<ChannelId>,
        kind: MessageKind,
        payload: Vec<u8>,
        handle: Handle,
    ) -> Result<(), SessionError> {
        let stream_id = self
            .streams
            .get(&handle.as_u64())
            .map(|s| s.stream_id)
            .ok_or_else(|| {
                SessionError::invalid_handle(handle.as_u64(), "attempt to submit on an unregistered handle")
            })?;
        let channel = active_channel(channel)?;
        reactor
            .submit(channel, StreamMessage::new(stream_id, kind, payload))
            .map_err(reactor_failure)
    }

    /// Route an inbound item event. Returns the callback sentinel and
    /// whether a user callback was invoked.
    pub fn process(&mut self, channel: ChannelId, event: ItemEvent) -> (CallbackRet, bool) {
        let Some(&raw) = self.by_stream_id.get(&event.message.stream_id) else {
            warn!(
                stream_id = event.message.stream_id,
                "item event without a matching stream"
            );
            return (CallbackRet::Success, false);
        };
        let Some(stream) = self.streams.get_mut(&raw) else {
            return (CallbackRet::Success, false);
        };
        let stream_event = StreamEvent {
            handle: stream.handle,
            closure: stream.closure.clone(),
            channel: Some(channel),
            message: event.message,
        };
        deliver(stream.client.as_mut(), &stream_event);
        (CallbackRet::Success, true)
    }

    /// Drop all streams without closing them on the wire; teardown has
    /// already closed the channels.
    pub fn clear(&mut self) {
        self.streams.clear();
        self.by_stream_id.clear();
    }
}

fn active_channel(channel: Option<ChannelId>) -> Result<ChannelId, SessionError> {
    channel.ok_or_else(|| {
        SessionError::invalid_usage("no active channel", ErrorCode::InvalidOperation)
    })
}

fn reactor_failure(e: tl_reactor::ReactorError) -> SessionError {
    SessionError::invalid_usage(e.to_string(), ErrorCode::ReactorFailure(e.code))
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
