// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materializes an [`ActiveConfig`] from the configuration layers.
//!
//! Precedence, highest first: per-call override, programmatic value, file
//! value, built-in default. Unsigned values saturate at `u32::MAX`;
//! reconnect bounds clamp to the `i32` range. Warnings accumulate in a
//! [`ConfigErrorBuffer`] for the caller to flush once a logger exists.

use tl_core::{ErrorCode, SessionError, Severity};
use tracing::debug;

use crate::active::{ActiveConfig, DispatchMode, LoggerType};
use crate::channel::{
    ChannelConfig, ChannelKind, CompressionType, EncryptedConfig, EncryptedProtocol,
    MulticastConfig, DEFAULT_COMPRESSION_THRESHOLD_LZ4, DEFAULT_INITIALIZATION_TIMEOUT_ENCRYPTED,
    DEFAULT_SERVICE,
};
use crate::errors::ConfigErrorBuffer;
use crate::overrides::CallOverrides;
use crate::source::ConfigStore;
use crate::warm_standby::{WarmStandbyChannelConfig, WarmStandbyMode, WarmStandbyServerInfo};

/// Output of [`resolve`].
#[derive(Debug)]
pub struct Resolved {
    pub config: ActiveConfig,
    pub messages: ConfigErrorBuffer,
}

/// Resolve the full session configuration for `configured_name`.
pub fn resolve(
    store: &ConfigStore,
    overrides: &CallOverrides,
    configured_name: &str,
    instance_id: u64,
) -> Result<Resolved, SessionError> {
    let mut config = ActiveConfig::new(configured_name, instance_id);
    let mut buf = ConfigErrorBuffer::new();
    let node = format!("SessionGroup|SessionList|{configured_name}");

    read_instance_scalars(store, &node, &mut config);
    read_logger_config(store, &node, &mut config, &mut buf);

    if let Some(port) = store.get_i64(&format!("{node}|PipePort")) {
        config.pipe_port = port;
        buf.append(
            "PipePort is accepted for compatibility and ignored; this platform uses anonymous pipes.",
            Severity::Verbose,
        );
    }

    if let Some(name) = &overrides.lib_ssl_name {
        config.lib_ssl_name = name.clone();
        config.lib_crypto_name = overrides.lib_crypto_name.clone().unwrap_or_default();
    }
    if let Some(name) = &overrides.lib_curl_name {
        config.lib_curl_name = name.clone();
    }
    if let Some(url) = &overrides.service_discovery_url {
        config.service_discovery_url = url.clone();
    }
    if let Some(url) = &overrides.token_service_url_v1 {
        config.token_service_url_v1 = url.clone();
    }
    if let Some(url) = &overrides.token_service_url_v2 {
        config.token_service_url_v2 = url.clone();
    }

    let channel_list = store
        .get_str(&format!("{node}|Channel"))
        .map(|s| split_list(&s))
        .unwrap_or_default();
    let wsb_list = store
        .get_str(&format!("{node}|WarmStandbyChannelSet"))
        .map(|s| split_list(&s))
        .unwrap_or_default();

    if !channel_list.is_empty() {
        let last = channel_list.len() - 1;
        for (pos, name) in channel_list.iter().enumerate() {
            let channel =
                read_channel_config(store, overrides, name, pos == last, &mut config, &mut buf)?;
            config.channel_set.push(channel);
        }
    } else if wsb_list.is_empty() {
        config.channel_set.push(default_channel(overrides));
    }

    for name in &wsb_list {
        if let Some(group) = read_warm_standby(store, overrides, name, &mut config, &mut buf)? {
            config.warm_standby_set.push(group);
        }
    }

    debug!(
        instance = %config.instance_name,
        channels = config.channel_set.len(),
        warm_standby = config.warm_standby_set.len(),
        "configuration resolved"
    );

    Ok(Resolved {
        config,
        messages: buf,
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// The channel synthesized when neither a channel set nor a warm-standby
/// set is configured.
fn default_channel(overrides: &CallOverrides) -> ChannelConfig {
    let mut channel = ChannelConfig::socket("Channel");
    if let Some(socket) = channel.socket_config_mut() {
        if let Some(host) = &overrides.host {
            socket.host = host.clone();
        }
        match &overrides.port {
            Some(port) if !port.is_empty() => socket.service = port.clone(),
            Some(_) => socket.service = DEFAULT_SERVICE.to_string(),
            None => {}
        }
    }
    channel.apply_endpoint_defaults();
    channel
}

fn read_instance_scalars(store: &ConfigStore, node: &str, config: &mut ActiveConfig) {
    let key = |name: &str| format!("{node}|{name}");

    if let Some(v) = store.get_u64(&key("ItemCountHint")) {
        config.item_count_hint = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("ServiceCountHint")) {
        config.service_count_hint = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("RequestTimeout")) {
        config.request_timeout_ms = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("LoginRequestTimeOut")) {
        config.login_request_timeout_ms = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("RestRequestTimeOut")) {
        config.rest_request_timeout_ms = saturate_u32(v);
    }
    if let Some(v) = store.get_i64(&key("DispatchTimeoutApiThread")) {
        config.dispatch_timeout_api_thread_us = v;
    }
    if let Some(v) = store.get_u64(&key("MaxDispatchCountApiThread")) {
        config.max_dispatch_count_api_thread = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("MaxDispatchCountUserThread")) {
        config.max_dispatch_count_user_thread = saturate_u32(v);
    }
    if let Some(v) = store.get_i64(&key("MaxEventsInPool")) {
        config.max_events_in_pool =
            i32::try_from(v.clamp(-1, i64::from(i32::MAX))).unwrap_or(i32::MAX);
    }
    if let Some(v) = store.get_bool(&key("CatchUnhandledException")) {
        config.catch_unhandled_exception = v;
    }
    if let Some(v) = store.get_str(&key("DispatchModel")) {
        if let Some(mode) = DispatchMode::parse(&v) {
            config.dispatch_mode = mode;
        }
    }

    if let Some(v) = store.get_f64(&key("TokenReissueRatio")) {
        config.token_reissue_ratio = v;
    }
    if let Some(v) = store.get_i64(&key("ReissueTokenAttemptLimit")) {
        config.reissue_token_attempt_limit = v;
    }
    if let Some(v) = store.get_i64(&key("ReissueTokenAttemptInterval")) {
        config.reissue_token_attempt_interval_ms = v;
    }

    if let Some(v) = store.get_i64(&key("ReconnectAttemptLimit")) {
        config.set_reconnect_attempt_limit(v);
    }
    if let Some(v) = store.get_i64(&key("ReconnectMinDelay")) {
        config.set_reconnect_min_delay(v);
    }
    if let Some(v) = store.get_i64(&key("ReconnectMaxDelay")) {
        config.set_reconnect_max_delay(v);
    }

    if let Some(v) = store.get_str(&key("XmlTraceFileName")) {
        config.xml_trace_file_name = v;
    }
    if let Some(v) = store.get_i64(&key("XmlTraceMaxFileSize")) {
        if v > 0 {
            config.xml_trace_max_file_size = v;
        }
    }
    if let Some(v) = store.get_bool(&key("XmlTraceToFile")) {
        config.xml_trace_to_file = v;
    }
    if let Some(v) = store.get_bool(&key("XmlTraceToStdout")) {
        config.xml_trace_to_stdout = v;
    }
    if let Some(v) = store.get_bool(&key("XmlTraceToMultipleFiles")) {
        config.xml_trace_to_multiple_files = v;
    }
    if let Some(v) = store.get_bool(&key("XmlTraceWrite")) {
        config.xml_trace_write = v;
    }
    if let Some(v) = store.get_bool(&key("XmlTraceRead")) {
        config.xml_trace_read = v;
    }
    if let Some(v) = store.get_bool(&key("XmlTracePing")) {
        config.xml_trace_ping = v;
    }
    if let Some(v) = store.get_bool(&key("XmlTraceHex")) {
        config.xml_trace_hex = v;
    }
    if let Some(v) = store.get_bool(&key("XmlTraceDump")) {
        config.xml_trace_dump = v;
    }

    if let Some(v) = store.get_bool(&key("MsgKeyInUpdates")) {
        config.msg_key_in_updates = v;
    }
    if let Some(v) = store.get_u64(&key("DefaultServiceID")) {
        config.default_service_id_for_converter = u16::try_from(v).unwrap_or(u16::MAX);
    }
    if let Some(v) = store.get_bool(&key("JsonExpandedEnumFields")) {
        config.json_expanded_enum_fields = v;
    }
    if let Some(v) = store.get_bool(&key("CatchUnknownJsonFids")) {
        config.catch_unknown_json_fids = v;
    }
    if let Some(v) = store.get_bool(&key("CatchUnknownJsonKeys")) {
        config.catch_unknown_json_keys = v;
    }
    if let Some(v) = store.get_bool(&key("CloseChannelFromConverterFailure")) {
        config.close_channel_from_converter_failure = v;
    }
    if let Some(v) = store.get_bool(&key("EnableRtt")) {
        config.enable_rtt = v;
    }
    if let Some(v) = store.get_u64(&key("OutputBufferSize")) {
        config.output_buffer_size = saturate_u32(v);
    }

    if let Some(v) = store.get_str(&key("RestLogFileName")) {
        config.rest_log_file_name = v;
    }
    if let Some(v) = store.get_bool(&key("RestEnableLog")) {
        config.rest_enable_log = v;
    }
}

fn read_logger_config(
    store: &ConfigStore,
    node: &str,
    config: &mut ActiveConfig,
    buf: &mut ConfigErrorBuffer,
) {
    let Some(logger_name) = store.get_str(&format!("{node}|Logger")) else {
        return;
    };
    config.logger_config.logger_name = logger_name.clone();

    let logger_node = format!("LoggerGroup|LoggerList|{logger_name}");
    if !store.node_exists(&logger_node) {
        buf.append(
            format!(
                "no configuration exists for logger [{logger_node}]; will use logger defaults"
            ),
            Severity::Error,
        );
        return;
    }

    let key = |name: &str| format!("{logger_node}|{name}");
    if let Some(v) = store.get_str(&key("LoggerType")) {
        if let Some(logger_type) = LoggerType::parse(&v) {
            config.logger_config.logger_type = logger_type;
        }
    }
    if config.logger_config.logger_type == LoggerType::File {
        if let Some(v) = store.get_str(&key("FileName")) {
            config.logger_config.file_name = v;
        }
    }
    if let Some(v) = store.get_str(&key("LoggerSeverity")) {
        if let Some(severity) = Severity::parse(&v) {
            config.logger_config.min_severity = severity;
        }
    }
    if let Some(v) = store.get_bool(&key("IncludeDateInLoggerOutput")) {
        config.logger_config.include_date = v;
    }
    if let Some(v) = store.get_u64(&key("MaxLogFileSize")) {
        config.logger_config.max_file_size = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("NumberOfLogFiles")) {
        config.logger_config.max_file_number = saturate_u32(v);
    }
}

/// Read one channel node into a [`ChannelConfig`].
///
/// `read_last` gates the deprecated per-channel keys: in a channel set they
/// are applied, last channel wins, and each read emits a warning.
fn read_channel_config(
    store: &ConfigStore,
    overrides: &CallOverrides,
    channel_name: &str,
    read_last: bool,
    config: &mut ActiveConfig,
    buf: &mut ConfigErrorBuffer,
) -> Result<ChannelConfig, SessionError> {
    let node = format!("ChannelGroup|ChannelList|{channel_name}");
    let key = |name: &str| format!("{node}|{name}");

    // A user-specified host forces a plain socket connection.
    let channel_type = if overrides.host.is_some() {
        "Socket".to_string()
    } else {
        store
            .get_str(&key("ChannelType"))
            .unwrap_or_else(|| "Socket".to_string())
    };

    let mut channel = match channel_type.as_str() {
        "Socket" | "Http" | "WebSocket" => ChannelConfig::socket(channel_name),
        "Encrypted" => {
            let mut channel = ChannelConfig::socket(channel_name);
            channel.initialization_timeout = DEFAULT_INITIALIZATION_TIMEOUT_ENCRYPTED;
            let mut encrypted = EncryptedConfig::default();
            if let Some(protocol) = store
                .get_str(&key("EncryptedProtocolType"))
                .and_then(|v| EncryptedProtocol::parse(&v))
            {
                encrypted.protocol = protocol;
            }
            encrypted.security_protocol = overrides
                .security_protocol
                .or_else(|| store.get_u64(&key("SecurityProtocol")).map(saturate_u32))
                .unwrap_or(0);
            encrypted.ssl_ca_store = overrides
                .ssl_ca_store
                .clone()
                .or_else(|| store.get_str(&key("OpenSSLCAStore")))
                .unwrap_or_default();
            if let Some(location) = store.get_str(&key("Location")) {
                encrypted.location = location;
            }
            if let Some(count) = store.get_u64(&key("ServiceDiscoveryRetryCount")) {
                encrypted.service_discovery_retry_count = saturate_u32(count);
            }
            if let Some(socket) = channel.socket_config_mut() {
                socket.encrypted = Some(encrypted);
            }
            channel
        }
        "ReliableMulticast" => ChannelConfig {
            kind: ChannelKind::ReliableMulticast(read_multicast_config(store, &node)?),
            ..ChannelConfig::socket(channel_name)
        },
        other => {
            return Err(SessionError::invalid_usage(
                format!("not supported channel type. Type = {other}"),
                ErrorCode::UnsupportedChannelType,
            ));
        }
    };

    if let Some(socket) = channel.socket_config_mut() {
        socket.session_management = store
            .get_bool(&key("EnableSessionManagement"))
            .unwrap_or(false);

        socket.host = overrides
            .host
            .clone()
            .or_else(|| store.get_str(&key("Host")))
            .unwrap_or_default();
        socket.service = match &overrides.port {
            Some(port) if !port.is_empty() => port.clone(),
            Some(_) => DEFAULT_SERVICE.to_string(),
            None => store.get_str(&key("Port")).unwrap_or_default(),
        };

        socket.proxy.host = overrides
            .proxy_host
            .clone()
            .or_else(|| store.get_str(&key("ProxyHost")))
            .unwrap_or_default();
        socket.proxy.port = overrides
            .proxy_port
            .clone()
            .or_else(|| store.get_str(&key("ProxyPort")))
            .unwrap_or_default();
        if let Some(user) = &overrides.proxy_user_name {
            socket.proxy.user_name = user.clone();
        }
        if let Some(password) = &overrides.proxy_password {
            socket.proxy.password = password.clone();
        }
        if let Some(domain) = &overrides.proxy_domain {
            socket.proxy.domain = domain.clone();
        }

        socket.tcp_nodelay = store.get_bool(&key("TcpNodelay")).unwrap_or(true);
        socket.object_name = overrides
            .object_name
            .clone()
            .or_else(|| store.get_str(&key("ObjectName")))
            .unwrap_or_default();

        channel.apply_endpoint_defaults();
    }

    if let Some(v) = store.get_str(&key("InterfaceName")) {
        channel.interface_name = v;
    }
    if !matches!(channel.kind, ChannelKind::ReliableMulticast(_)) {
        let threshold_from_file = store.get_u64(&key("CompressionThreshold"));
        if let Some(threshold) = threshold_from_file {
            channel.compression_threshold = saturate_u32(threshold);
        }
        if let Some(compression) = store
            .get_str(&key("CompressionType"))
            .and_then(|v| CompressionType::parse(&v))
        {
            channel.compression_type = compression;
            if compression == CompressionType::Lz4 && threshold_from_file.is_none() {
                channel.compression_threshold = DEFAULT_COMPRESSION_THRESHOLD_LZ4;
            }
        }
    }
    if let Some(v) = store.get_u64(&key("GuaranteedOutputBuffers")) {
        channel.guaranteed_output_buffers = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("NumInputBuffers")) {
        channel.num_input_buffers = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("ConnectionPingTimeout")) {
        channel.connection_ping_timeout_ms = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("InitializationTimeout")) {
        channel.initialization_timeout = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("SysRecvBufSize")) {
        channel.sys_recv_buf_size = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("SysSendBufSize")) {
        channel.sys_send_buf_size = saturate_u32(v);
    }
    if let Some(v) = store.get_u64(&key("HighWaterMark")) {
        channel.high_water_mark = saturate_u32(v);
    }

    if read_last {
        read_deprecated_channel_keys(store, &node, config, buf);
    }

    Ok(channel)
}

/// Deprecated per-channel keys still update the instance-level config, with
/// a warning each; in a multi-channel set the last channel read wins.
fn read_deprecated_channel_keys(
    store: &ConfigStore,
    node: &str,
    config: &mut ActiveConfig,
    buf: &mut ConfigErrorBuffer,
) {
    let key = |name: &str| format!("{node}|{name}");
    let mut deprecated = |buf: &mut ConfigErrorBuffer, name: &str| {
        buf.append(
            format!(
                "{name} is no longer configured on a per-channel basis; configure it instead on the session instance."
            ),
            Severity::Warning,
        );
    };

    if let Some(v) = store.get_i64(&key("ReconnectAttemptLimit")) {
        config.set_reconnect_attempt_limit(v);
        deprecated(buf, "ReconnectAttemptLimit");
    }
    if let Some(v) = store.get_i64(&key("ReconnectMinDelay")) {
        config.set_reconnect_min_delay(v);
        deprecated(buf, "ReconnectMinDelay");
    }
    if let Some(v) = store.get_i64(&key("ReconnectMaxDelay")) {
        config.set_reconnect_max_delay(v);
        deprecated(buf, "ReconnectMaxDelay");
    }
    if let Some(v) = store.get_str(&key("XmlTraceFileName")) {
        config.xml_trace_file_name = v;
        deprecated(buf, "XmlTraceFileName");
    }
    if let Some(v) = store.get_i64(&key("XmlTraceMaxFileSize")) {
        if v > 0 {
            config.xml_trace_max_file_size = v;
        }
        deprecated(buf, "XmlTraceMaxFileSize");
    }
    if let Some(v) = store.get_bool(&key("XmlTraceToFile")) {
        if v {
            config.xml_trace_to_file = true;
        }
        deprecated(buf, "XmlTraceToFile");
    }
    if let Some(v) = store.get_bool(&key("XmlTraceToStdout")) {
        config.xml_trace_to_stdout = v;
        deprecated(buf, "XmlTraceToStdout");
    }
    if let Some(v) = store.get_bool(&key("XmlTraceToMultipleFiles")) {
        if v {
            config.xml_trace_to_multiple_files = true;
        }
        deprecated(buf, "XmlTraceToMultipleFiles");
    }
    if let Some(v) = store.get_bool(&key("XmlTraceWrite")) {
        if !v {
            config.xml_trace_write = false;
        }
        deprecated(buf, "XmlTraceWrite");
    }
    if let Some(v) = store.get_bool(&key("XmlTraceRead")) {
        if !v {
            config.xml_trace_read = false;
        }
        deprecated(buf, "XmlTraceRead");
    }
    if let Some(v) = store.get_bool(&key("XmlTracePing")) {
        config.xml_trace_ping = v;
        deprecated(buf, "XmlTracePing");
    }
    if let Some(v) = store.get_bool(&key("XmlTraceHex")) {
        config.xml_trace_hex = v;
        deprecated(buf, "XmlTraceHex");
    }
    if let Some(v) = store.get_bool(&key("MsgKeyInUpdates")) {
        if !v {
            config.msg_key_in_updates = false;
        }
        deprecated(buf, "MsgKeyInUpdates");
    }
}

fn read_multicast_config(
    store: &ConfigStore,
    node: &str,
) -> Result<MulticastConfig, SessionError> {
    let key = |name: &str| format!("{node}|{name}");
    let required = |name: &str| -> Result<String, SessionError> {
        store.get_str(&key(name)).filter(|v| !v.is_empty()).ok_or_else(|| {
            SessionError::invalid_usage(
                format!(
                    "invalid channel configuration for ChannelType [ReliableMulticast]; missing required parameter [{name}]"
                ),
                ErrorCode::InvalidArgument,
            )
        })
    };

    let mut mcast = MulticastConfig {
        recv_address: required("RecvAddress")?,
        recv_service: required("RecvPort")?,
        unicast_service: required("UnicastPort")?,
        send_address: required("SendAddress")?,
        send_service: required("SendPort")?,
        ..MulticastConfig::default()
    };
    mcast.disconnect_on_gap = store.get_bool(&key("DisconnectOnGap")).unwrap_or(false);
    if let Some(v) = store.get_u64(&key("PacketTTL")) {
        mcast.packet_ttl = saturate_u32(v);
    }
    if let Some(v) = store.get_str(&key("HsmInterface")) {
        mcast.hsm_interface = v;
    }
    if let Some(v) = store.get_str(&key("HsmMultAddress")) {
        mcast.hsm_address = v;
    }
    if let Some(v) = store.get_str(&key("HsmPort")) {
        mcast.hsm_service = v;
    }
    if let Some(v) = store.get_u64(&key("HsmInterval")) {
        mcast.hsm_interval = saturate_u32(v);
    }
    Ok(mcast)
}

fn read_warm_standby(
    store: &ConfigStore,
    overrides: &CallOverrides,
    group_name: &str,
    config: &mut ActiveConfig,
    buf: &mut ConfigErrorBuffer,
) -> Result<Option<WarmStandbyChannelConfig>, SessionError> {
    let node = format!("WarmStandbyGroup|WarmStandbyList|{group_name}");
    if !store.node_exists(&node) {
        buf.append(
            format!("no configuration exists for warm standby channel [{group_name}]; entry skipped"),
            Severity::Warning,
        );
        return Ok(None);
    }
    let key = |name: &str| format!("{node}|{name}");

    let starting_active = match store.get_str(&key("StartingActiveServer")) {
        Some(server) => read_server_info(store, overrides, &server, config, buf)?,
        None => None,
    };

    let mut standby_set = Vec::new();
    if let Some(list) = store.get_str(&key("StandbyServerSet")) {
        for server in split_list(&list) {
            if let Some(info) = read_server_info(store, overrides, &server, config, buf)? {
                standby_set.push(info);
            }
        }
    }

    let mode = store
        .get_str(&key("WarmStandbyMode"))
        .and_then(|v| WarmStandbyMode::parse(&v))
        .unwrap_or_default();

    Ok(Some(WarmStandbyChannelConfig {
        name: group_name.to_string(),
        starting_active,
        standby_set,
        mode,
    }))
}

/// Resolve one warm-standby server info node. Returns `None` (after a
/// buffered warning) when the referenced channel is missing from the
/// catalog; channels that do resolve are also appended to the dedicated
/// warm-standby channel collection.
fn read_server_info(
    store: &ConfigStore,
    overrides: &CallOverrides,
    server_name: &str,
    config: &mut ActiveConfig,
    buf: &mut ConfigErrorBuffer,
) -> Result<Option<WarmStandbyServerInfo>, SessionError> {
    let node = format!("WarmStandbyServerInfoGroup|WarmStandbyServerInfoList|{server_name}");
    let key = |name: &str| format!("{node}|{name}");

    let Some(channel_name) = store.get_str(&key("Channel")).filter(|v| !v.is_empty()) else {
        buf.append(
            format!("warm standby server [{server_name}] names no channel; entry skipped"),
            Severity::Warning,
        );
        return Ok(None);
    };
    if !store.node_exists(&format!("ChannelGroup|ChannelList|{channel_name}")) {
        buf.append(
            format!(
                "warm standby server [{server_name}] references unknown channel [{channel_name}]; entry skipped"
            ),
            Severity::Warning,
        );
        return Ok(None);
    }

    let channel = read_channel_config(store, overrides, &channel_name, true, config, buf)?;
    config.channel_set_for_warm_standby.push(channel.clone());

    let per_service_names = store
        .get_str(&key("PerServiceNameSet"))
        .map(|s| split_list(&s))
        .unwrap_or_default();

    Ok(Some(WarmStandbyServerInfo {
        name: server_name.to_string(),
        channel,
        per_service_names,
    }))
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
