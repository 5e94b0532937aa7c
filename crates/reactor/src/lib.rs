// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tl-reactor: the transport reactor collaborator interface
//!
//! The session core treats the reactor as a black box: it creates one per
//! session, registers its event descriptor in the readiness set, and calls
//! [`Reactor::dispatch`], which synchronously invokes [`EventSink`]
//! callbacks on the session. A scriptable [`stub::StubReactor`] backs the
//! test suites.

pub mod event;
#[cfg(any(test, feature = "test-support"))]
pub mod stub;
pub mod transport;

use std::io;

use mio::{Registry, Token};
use thiserror::Error;

use tl_config::{ChannelConfig, WarmStandbyChannelConfig};

use crate::event::{
    ChannelEvent, ChannelId, DictionaryEvent, DirectoryEvent, ItemEvent, JsonConversionError,
    LoginEvent, OAuthCredential, OAuthRenewalEvent, RestLogEvent, StreamMessage,
};

/// Failure reported by the reactor library.
#[derive(Debug, Clone, Error)]
#[error("reactor error (id {code}, sysError {sys_error}) at {location}: {text}")]
pub struct ReactorError {
    pub code: i32,
    pub sys_error: i64,
    pub location: String,
    pub text: String,
}

impl ReactorError {
    pub fn new(code: i32, location: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code,
            sys_error: 0,
            location: location.into(),
            text: text.into(),
        }
    }
}

/// Options supplied when creating a reactor.
#[derive(Debug, Clone, Default)]
pub struct ReactorOptions {
    pub service_discovery_url: Option<String>,
    pub token_service_url_v1: Option<String>,
    pub token_service_url_v2: Option<String>,
    pub token_reissue_ratio: f64,
    pub reissue_token_attempt_limit: i64,
    pub reissue_token_attempt_interval_ms: i64,
    pub rest_request_timeout_ms: u32,
    pub max_events_in_pool: i32,
    pub rest_enable_log: bool,
    pub rest_log_file_name: Option<String>,
    /// Whether the session wants rest-log events surfaced as callbacks.
    pub rest_logging_callback: bool,
}

/// Per-call dispatch options.
#[derive(Debug, Clone, Copy)]
pub struct DispatchOpts {
    /// Upper bound on handler callbacks invoked by one dispatch call.
    pub max_messages: u32,
}

/// What a dispatch call left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// More work is queued; call dispatch again.
    MorePending,
    /// The queue is drained.
    Done,
}

/// Sentinel a sink callback hands back to the reactor, unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackRet {
    Success,
    Failure,
}

/// JSON/RWF converter initialization options.
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    pub default_service_id: u16,
    pub json_expanded_enum_fields: bool,
    pub catch_unknown_json_keys: bool,
    pub catch_unknown_json_fids: bool,
    pub close_channel_from_failure: bool,
    pub output_buffer_size: u32,
}

/// Login stream request resolved at bring-up.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub user_name: String,
    pub application_id: String,
    pub position: String,
}

/// Source directory request resolved at bring-up.
#[derive(Debug, Clone, Default)]
pub struct DirectoryRequest {
    pub filter: u32,
}

/// Everything the reactor needs to bring one channel (or warm-standby
/// group) up.
#[derive(Debug, Clone)]
pub struct ChannelOpenRequest {
    pub channel: ChannelConfig,
    pub warm_standby: Option<WarmStandbyChannelConfig>,
    pub login_request: LoginRequest,
    pub directory_request: DirectoryRequest,
    pub oauth: Option<OAuthCredential>,
    pub reconnect_attempt_limit: i64,
    pub reconnect_min_delay_ms: i64,
    pub reconnect_max_delay_ms: i64,
}

/// Static description of a connected channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInformation {
    pub name: String,
    pub hostname: String,
    pub port: String,
    pub component_info: String,
    pub channel_state: String,
}

/// Traffic counters for a connected channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStatistics {
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub pings_received: u64,
    pub pings_sent: u64,
}

/// Callbacks the reactor fires synchronously from within
/// [`Reactor::dispatch`]. The caller of dispatch holds the session's user
/// lock for the duration, so implementations may touch session state
/// freely but must never re-acquire that lock.
pub trait EventSink {
    fn on_channel_event(&mut self, event: ChannelEvent) -> CallbackRet;
    fn on_login_event(&mut self, channel: ChannelId, event: LoginEvent) -> CallbackRet;
    fn on_directory_event(&mut self, channel: ChannelId, event: DirectoryEvent) -> CallbackRet;
    fn on_dictionary_event(&mut self, channel: ChannelId, event: DictionaryEvent) -> CallbackRet;
    fn on_item_event(&mut self, channel: ChannelId, event: ItemEvent) -> CallbackRet;
    fn on_oauth_renewal(&mut self, event: OAuthRenewalEvent) -> CallbackRet;
    fn on_json_conversion_error(&mut self, event: JsonConversionError) -> CallbackRet;
    fn on_rest_log(&mut self, event: RestLogEvent) -> CallbackRet;
    /// Synchronous service-name lookup used by the JSON converter.
    fn service_name_to_id(&mut self, name: &str) -> Option<u16>;
}

/// The transport reactor, as consumed by the session core.
pub trait Reactor: Send {
    /// Register the reactor's event descriptor with the readiness set.
    fn register_event_source(&mut self, registry: &Registry, token: Token) -> io::Result<()>;

    /// Remove the reactor's event descriptor from the readiness set.
    fn deregister_event_source(&mut self, registry: &Registry) -> io::Result<()>;

    /// Deliver up to `opts.max_messages` queued events to `sink`.
    fn dispatch(
        &mut self,
        opts: &DispatchOpts,
        sink: &mut dyn EventSink,
    ) -> Result<DispatchOutcome, ReactorError>;

    /// Begin connecting a channel; events arrive through dispatch.
    fn connect(&mut self, request: ChannelOpenRequest) -> Result<ChannelId, ReactorError>;

    fn close_channel(&mut self, channel: ChannelId) -> Result<(), ReactorError>;

    fn init_json_converter(&mut self, options: &ConverterOptions) -> Result<(), ReactorError>;

    /// Enqueue an outbound message on a stream.
    fn submit(&mut self, channel: ChannelId, message: StreamMessage) -> Result<(), ReactorError>;

    /// Hand renewed OAuth credentials to the reactor's token machinery.
    fn submit_oauth_credentials(&mut self, credential: &OAuthCredential)
        -> Result<(), ReactorError>;

    /// Runtime tuning knob passthrough.
    fn ioctl(&mut self, code: i32, value: i32) -> Result<(), ReactorError>;

    fn channel_information(&self, channel: ChannelId) -> Result<ChannelInformation, ReactorError>;

    fn channel_statistics(&self, channel: ChannelId) -> Result<ChannelStatistics, ReactorError>;
}
