// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events the reactor surfaces to the session.
//!
//! The session core routes these without interpreting payloads; decoded
//! message bodies travel as opaque bytes.

use std::fmt;
use std::os::fd::RawFd;

/// Identifier the reactor assigns to a channel at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a stream message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Refresh,
    Update,
    Status,
    Generic,
    Ack,
    Post,
    Close,
}

/// An opaque decoded message on a stream.
#[derive(Debug, Clone)]
pub struct StreamMessage {
    pub stream_id: i32,
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

impl StreamMessage {
    pub fn new(stream_id: i32, kind: MessageKind, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            stream_id,
            kind,
            payload: payload.into(),
        }
    }
}

/// Channel lifecycle notifications.
#[derive(Debug, Clone)]
pub enum ChannelEventKind {
    /// The channel object exists; no socket yet.
    Opened,
    /// Transport connected; `socket` carries the pollable descriptor.
    Up,
    /// Login exchange finished on this channel; fully usable.
    Ready,
    /// Transport lost; the reactor handles reconnection.
    Down { text: String },
    /// The descriptor changed (e.g. tunnel re-establishment).
    FdChange { old: RawFd, new: RawFd },
}

#[derive(Debug, Clone)]
pub struct ChannelEvent {
    pub channel: ChannelId,
    pub kind: ChannelEventKind,
    pub socket: Option<RawFd>,
}

/// Result of the login exchange carried on a login stream event.
#[derive(Debug, Clone)]
pub enum LoginStatus {
    Granted,
    Denied { text: String },
    /// Mid-stream update (e.g. RTT, entitlement refresh).
    Other,
}

#[derive(Debug, Clone)]
pub struct LoginEvent {
    pub status: LoginStatus,
    pub message: StreamMessage,
}

/// One service advertised by the upstream directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub id: u16,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum DirectoryEventKind {
    Refresh,
    Update,
}

#[derive(Debug, Clone)]
pub struct DirectoryEvent {
    pub kind: DirectoryEventKind,
    pub services: Vec<ServiceInfo>,
    pub message: StreamMessage,
}

#[derive(Debug, Clone)]
pub struct DictionaryEvent {
    pub name: String,
    /// Final part of a multi-part dictionary refresh.
    pub complete: bool,
    pub message: StreamMessage,
}

#[derive(Debug, Clone)]
pub struct ItemEvent {
    pub message: StreamMessage,
}

/// OAuth credentials supplied by the user for token renewal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthCredential {
    pub client_id: String,
    pub client_secret: String,
    pub token_scope: String,
}

/// Fired when the reactor needs renewed credentials.
#[derive(Debug, Clone)]
pub struct OAuthRenewalEvent {
    pub channel: Option<ChannelId>,
}

/// A JSON/RWF conversion failure surfaced by the reactor.
#[derive(Debug, Clone)]
pub struct JsonConversionError {
    pub code: i32,
    pub text: String,
    pub channel: Option<ChannelId>,
}

/// One REST interaction log line from the reactor's token machinery.
#[derive(Debug, Clone)]
pub struct RestLogEvent {
    pub message: String,
}

/// Union of everything a dispatch call can surface; used by reactor
/// implementations to queue work.
#[derive(Debug, Clone)]
pub enum ReactorEvent {
    Channel(ChannelEvent),
    Login { channel: ChannelId, event: LoginEvent },
    Directory { channel: ChannelId, event: DirectoryEvent },
    Dictionary { channel: ChannelId, event: DictionaryEvent },
    Item { channel: ChannelId, event: ItemEvent },
    OAuthRenewal(OAuthRenewalEvent),
    JsonConversionError(JsonConversionError),
    RestLog(RestLogEvent),
}
