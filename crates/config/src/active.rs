// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The resolved, immutable-after-bring-up session configuration.

use std::fmt::Write as _;

use tl_core::Severity;

use crate::channel::ChannelConfig;
use crate::warm_standby::WarmStandbyChannelConfig;

pub const DEFAULT_ITEM_COUNT_HINT: u32 = 100_000;
pub const DEFAULT_SERVICE_COUNT_HINT: u32 = 513;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 15_000;
pub const DEFAULT_LOGIN_REQUEST_TIMEOUT_MS: u32 = 45_000;
pub const DEFAULT_REST_REQUEST_TIMEOUT_MS: u32 = 90_000;
/// Negative means "wait indefinitely, bounded by the next timer".
pub const DEFAULT_DISPATCH_TIMEOUT_API_THREAD_US: i64 = -1;
pub const DEFAULT_MAX_DISPATCH_COUNT_API_THREAD: u32 = 100;
pub const DEFAULT_MAX_DISPATCH_COUNT_USER_THREAD: u32 = 100;
pub const DEFAULT_MAX_EVENTS_IN_POOL: i32 = -1;
pub const DEFAULT_TOKEN_REISSUE_RATIO: f64 = 0.8;
pub const DEFAULT_REISSUE_TOKEN_ATTEMPT_LIMIT: i64 = -1;
pub const DEFAULT_REISSUE_TOKEN_ATTEMPT_INTERVAL_MS: i64 = 5_000;
pub const DEFAULT_RECONNECT_ATTEMPT_LIMIT: i64 = -1;
pub const DEFAULT_RECONNECT_MIN_DELAY_MS: i64 = 1_000;
pub const DEFAULT_RECONNECT_MAX_DELAY_MS: i64 = 5_000;
pub const DEFAULT_XML_TRACE_MAX_FILE_SIZE: i64 = 100_000_000;
pub const DEFAULT_OUTPUT_BUFFER_SIZE: u32 = 65_535;
/// Sentinel meaning "no default service id configured for the converter".
pub const DEFAULT_SERVICE_ID_FOR_CONVERTER: u16 = u16::MAX;
pub const DEFAULT_PIPE_PORT: i64 = 9001;

/// Who drives the dispatch loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// An internal thread owns the loop.
    #[default]
    ApiDispatch,
    /// The user calls `dispatch()` explicitly.
    UserDispatch,
}

impl DispatchMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ApiDispatch" => Some(Self::ApiDispatch),
            "UserDispatch" => Some(Self::UserDispatch),
            _ => None,
        }
    }
}

/// Role the session plays toward the upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionKind {
    #[default]
    Consumer,
    NonInteractiveProvider,
    InteractiveProvider,
}

/// Where the session logger writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoggerType {
    #[default]
    File,
    Stdout,
}

impl LoggerType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "File" => Some(Self::File),
            "Stdout" => Some(Self::Stdout),
            _ => None,
        }
    }
}

/// Resolved logger settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub logger_name: String,
    pub logger_type: LoggerType,
    pub min_severity: Severity,
    pub file_name: String,
    pub include_date: bool,
    /// Rotation threshold in bytes; 0 disables rotation.
    pub max_file_size: u32,
    /// Number of rotated files kept; 0 keeps one unbounded file.
    pub max_file_number: u32,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            logger_name: "Logger".to_string(),
            logger_type: LoggerType::File,
            min_severity: Severity::Success,
            file_name: "tickline".to_string(),
            include_date: false,
            max_file_size: 0,
            max_file_number: 0,
        }
    }
}

/// The materialized session configuration.
///
/// Built once by [`crate::resolver::resolve`]; the session treats it as
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct ActiveConfig {
    pub configured_name: String,
    pub instance_name: String,

    pub item_count_hint: u32,
    pub service_count_hint: u32,
    pub request_timeout_ms: u32,
    pub login_request_timeout_ms: u32,
    pub rest_request_timeout_ms: u32,
    pub dispatch_timeout_api_thread_us: i64,
    pub max_dispatch_count_api_thread: u32,
    pub max_dispatch_count_user_thread: u32,
    pub max_events_in_pool: i32,
    pub catch_unhandled_exception: bool,
    pub dispatch_mode: DispatchMode,

    pub token_reissue_ratio: f64,
    pub reissue_token_attempt_limit: i64,
    pub reissue_token_attempt_interval_ms: i64,

    pub reconnect_attempt_limit: i64,
    pub reconnect_min_delay_ms: i64,
    pub reconnect_max_delay_ms: i64,

    pub xml_trace_to_file: bool,
    pub xml_trace_to_stdout: bool,
    pub xml_trace_to_multiple_files: bool,
    pub xml_trace_write: bool,
    pub xml_trace_read: bool,
    pub xml_trace_ping: bool,
    pub xml_trace_hex: bool,
    pub xml_trace_dump: bool,
    pub xml_trace_file_name: String,
    pub xml_trace_max_file_size: i64,

    pub msg_key_in_updates: bool,
    pub default_service_id_for_converter: u16,
    pub json_expanded_enum_fields: bool,
    pub catch_unknown_json_fids: bool,
    pub catch_unknown_json_keys: bool,
    pub close_channel_from_converter_failure: bool,
    pub enable_rtt: bool,
    pub output_buffer_size: u32,

    pub rest_log_file_name: String,
    pub rest_enable_log: bool,

    /// Read for compatibility; anonymous pipes make it a no-op.
    pub pipe_port: i64,

    pub lib_ssl_name: String,
    pub lib_crypto_name: String,
    pub lib_curl_name: String,
    pub service_discovery_url: String,
    pub token_service_url_v1: String,
    pub token_service_url_v2: String,

    pub logger_config: LoggerConfig,

    /// Primary channel set.
    pub channel_set: Vec<ChannelConfig>,
    /// Warm-standby groups.
    pub warm_standby_set: Vec<WarmStandbyChannelConfig>,
    /// Channels reached through warm-standby groups; kept apart from the
    /// primary set.
    pub channel_set_for_warm_standby: Vec<ChannelConfig>,
}

impl ActiveConfig {
    /// Defaults for `configured_name`, instance-named with `instance_id`.
    pub fn new(configured_name: impl Into<String>, instance_id: u64) -> Self {
        let configured_name = configured_name.into();
        let instance_name = format!("{configured_name}_{instance_id}");
        Self {
            configured_name,
            instance_name,
            item_count_hint: DEFAULT_ITEM_COUNT_HINT,
            service_count_hint: DEFAULT_SERVICE_COUNT_HINT,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            login_request_timeout_ms: DEFAULT_LOGIN_REQUEST_TIMEOUT_MS,
            rest_request_timeout_ms: DEFAULT_REST_REQUEST_TIMEOUT_MS,
            dispatch_timeout_api_thread_us: DEFAULT_DISPATCH_TIMEOUT_API_THREAD_US,
            max_dispatch_count_api_thread: DEFAULT_MAX_DISPATCH_COUNT_API_THREAD,
            max_dispatch_count_user_thread: DEFAULT_MAX_DISPATCH_COUNT_USER_THREAD,
            max_events_in_pool: DEFAULT_MAX_EVENTS_IN_POOL,
            catch_unhandled_exception: true,
            dispatch_mode: DispatchMode::ApiDispatch,
            token_reissue_ratio: DEFAULT_TOKEN_REISSUE_RATIO,
            reissue_token_attempt_limit: DEFAULT_REISSUE_TOKEN_ATTEMPT_LIMIT,
            reissue_token_attempt_interval_ms: DEFAULT_REISSUE_TOKEN_ATTEMPT_INTERVAL_MS,
            reconnect_attempt_limit: DEFAULT_RECONNECT_ATTEMPT_LIMIT,
            reconnect_min_delay_ms: DEFAULT_RECONNECT_MIN_DELAY_MS,
            reconnect_max_delay_ms: DEFAULT_RECONNECT_MAX_DELAY_MS,
            xml_trace_to_file: false,
            xml_trace_to_stdout: false,
            xml_trace_to_multiple_files: false,
            xml_trace_write: true,
            xml_trace_read: true,
            xml_trace_ping: false,
            xml_trace_hex: false,
            xml_trace_dump: false,
            xml_trace_file_name: "TraceLog".to_string(),
            xml_trace_max_file_size: DEFAULT_XML_TRACE_MAX_FILE_SIZE,
            msg_key_in_updates: true,
            default_service_id_for_converter: DEFAULT_SERVICE_ID_FOR_CONVERTER,
            json_expanded_enum_fields: false,
            catch_unknown_json_fids: true,
            catch_unknown_json_keys: false,
            close_channel_from_converter_failure: true,
            enable_rtt: false,
            output_buffer_size: DEFAULT_OUTPUT_BUFFER_SIZE,
            rest_log_file_name: String::new(),
            rest_enable_log: false,
            pipe_port: DEFAULT_PIPE_PORT,
            lib_ssl_name: String::new(),
            lib_crypto_name: String::new(),
            lib_curl_name: String::new(),
            service_discovery_url: String::new(),
            token_service_url_v1: String::new(),
            token_service_url_v2: String::new(),
            logger_config: LoggerConfig::default(),
            channel_set: Vec::new(),
            warm_standby_set: Vec::new(),
            channel_set_for_warm_standby: Vec::new(),
        }
    }

    /// Clamp and store the reconnect attempt limit. Values below -1 read as
    /// unlimited; values above `i32::MAX` saturate.
    pub fn set_reconnect_attempt_limit(&mut self, value: i64) {
        self.reconnect_attempt_limit = value.clamp(-1, i64::from(i32::MAX));
    }

    /// Clamp and store the minimum reconnect delay; non-positive values are
    /// ignored.
    pub fn set_reconnect_min_delay(&mut self, value: i64) {
        if value > 0 {
            self.reconnect_min_delay_ms = value.min(i64::from(i32::MAX));
        }
    }

    /// Clamp and store the maximum reconnect delay; non-positive values are
    /// ignored.
    pub fn set_reconnect_max_delay(&mut self, value: i64) {
        if value > 0 {
            self.reconnect_max_delay_ms = value.min(i64::from(i32::MAX));
        }
    }

    /// Multi-line dump of the active configuration for verbose logging.
    pub fn config_trace(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "\n\tconfiguredName: {}\n\tinstanceName: {}\n\titemCountHint: {}\n\tserviceCountHint: {}\
             \n\trequestTimeout: {}\n\tloginRequestTimeOut: {}\n\tdispatchTimeoutApiThread: {}\
             \n\tmaxDispatchCountApiThread: {}\n\tmaxDispatchCountUserThread: {}\
             \n\treconnectAttemptLimit: {}\n\treconnectMinDelay: {}\n\treconnectMaxDelay: {}\
             \n\tmsgKeyInUpdates: {}\n\tdispatchMode: {:?}",
            self.configured_name,
            self.instance_name,
            self.item_count_hint,
            self.service_count_hint,
            self.request_timeout_ms,
            self.login_request_timeout_ms,
            self.dispatch_timeout_api_thread_us,
            self.max_dispatch_count_api_thread,
            self.max_dispatch_count_user_thread,
            self.reconnect_attempt_limit,
            self.reconnect_min_delay_ms,
            self.reconnect_max_delay_ms,
            self.msg_key_in_updates,
            self.dispatch_mode,
        );
        for channel in &self.channel_set {
            let _ = write!(out, "\n\tchannel: {}", channel.name);
        }
        for group in &self.warm_standby_set {
            let _ = write!(out, "\n\twarmStandbyChannel: {}", group.name);
        }
        out
    }

    /// Find a primary channel by name.
    pub fn find_channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channel_set.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
#[path = "active_tests.rs"]
mod tests;
