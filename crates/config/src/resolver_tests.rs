// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::channel::DEFAULT_HOST;
use tl_core::Severity;

fn store(text: &str) -> ConfigStore {
    ConfigStore::with_file_text(text).unwrap()
}

fn resolve_default(store: &ConfigStore) -> Resolved {
    resolve(store, &CallOverrides::default(), "Default", 1).unwrap()
}

#[test]
fn empty_config_synthesizes_default_channel() {
    let resolved = resolve_default(&ConfigStore::new());
    let config = resolved.config;

    assert_eq!(config.channel_set.len(), 1);
    assert!(config.warm_standby_set.is_empty());
    let channel = &config.channel_set[0];
    assert_eq!(channel.name, "Channel");
    let socket = channel.socket_config().unwrap();
    assert_eq!(socket.host, DEFAULT_HOST);
    assert_eq!(socket.service, "14002");
}

#[test]
fn default_channel_uses_call_overrides() {
    let overrides = CallOverrides {
        host: Some("feed.example.com".to_string()),
        port: Some("15000".to_string()),
        ..CallOverrides::default()
    };
    let resolved = resolve(&ConfigStore::new(), &overrides, "Default", 1).unwrap();
    let socket = resolved.config.channel_set[0].socket_config().unwrap().clone();
    assert_eq!(socket.host, "feed.example.com");
    assert_eq!(socket.service, "15000");
}

#[test]
fn call_override_beats_programmatic_beats_file() {
    let mut layered = store(
        r#"
[SessionGroup.SessionList.Default]
Channel = "A"

[ChannelGroup.ChannelList.A]
ChannelType = "Socket"
Host = "file-host"
"#,
    );
    layered
        .set_programmatic_text(
            r#"
[ChannelGroup.ChannelList.A]
Host = "prog-host"
"#,
        )
        .unwrap();

    // Programmatic beats file.
    let resolved = resolve_default(&layered);
    assert_eq!(
        resolved.config.channel_set[0].socket_config().unwrap().host,
        "prog-host"
    );

    // Per-call override beats both.
    let overrides = CallOverrides {
        host: Some("call-host".to_string()),
        ..CallOverrides::default()
    };
    let resolved = resolve(&layered, &overrides, "Default", 1).unwrap();
    assert_eq!(
        resolved.config.channel_set[0].socket_config().unwrap().host,
        "call-host"
    );
}

#[test]
fn unsigned_scalars_saturate_at_u32_max() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
ItemCountHint = 5000000000
RequestTimeout = 9000000000
"#,
    );
    let config = resolve_default(&store).config;
    assert_eq!(config.item_count_hint, u32::MAX);
    assert_eq!(config.request_timeout_ms, u32::MAX);
}

#[test]
fn reconnect_bounds_clamp_to_i32_range() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
ReconnectAttemptLimit = 99999999999
ReconnectMinDelay = 99999999999
"#,
    );
    let config = resolve_default(&store).config;
    assert_eq!(config.reconnect_attempt_limit, i64::from(i32::MAX));
    assert_eq!(config.reconnect_min_delay_ms, i64::from(i32::MAX));
}

#[test]
fn max_events_in_pool_floors_at_minus_one() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
MaxEventsInPool = -7
"#,
    );
    assert_eq!(resolve_default(&store).config.max_events_in_pool, -1);
}

#[test]
fn unknown_channel_type_fails() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
Channel = "A"

[ChannelGroup.ChannelList.A]
ChannelType = "CarrierPigeon"
"#,
    );
    let err = resolve(&store, &CallOverrides::default(), "Default", 1).unwrap_err();
    assert_eq!(err.code(), Some(tl_core::ErrorCode::UnsupportedChannelType));
    assert!(err.to_string().contains("CarrierPigeon"));
}

#[test]
fn multicast_requires_addresses() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
Channel = "M"

[ChannelGroup.ChannelList.M]
ChannelType = "ReliableMulticast"
RecvAddress = "235.1.1.1"
RecvPort = "30001"
UnicastPort = "30002"
SendAddress = "235.1.1.1"
"#,
    );
    let err = resolve(&store, &CallOverrides::default(), "Default", 1).unwrap_err();
    assert!(err.to_string().contains("SendPort"));
}

#[test]
fn multicast_full_config_resolves() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
Channel = "M"

[ChannelGroup.ChannelList.M]
ChannelType = "ReliableMulticast"
RecvAddress = "235.1.1.1"
RecvPort = "30001"
UnicastPort = "30002"
SendAddress = "235.1.1.1"
SendPort = "30003"
DisconnectOnGap = 1
PacketTTL = 4
"#,
    );
    let config = resolve_default(&store).config;
    match &config.channel_set[0].kind {
        ChannelKind::ReliableMulticast(mcast) => {
            assert_eq!(mcast.recv_address, "235.1.1.1");
            assert!(mcast.disconnect_on_gap);
            assert_eq!(mcast.packet_ttl, 4);
        }
        other => panic!("unexpected channel kind: {other:?}"),
    }
}

#[test]
fn encrypted_channel_gets_longer_init_timeout() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
Channel = "E"

[ChannelGroup.ChannelList.E]
ChannelType = "Encrypted"
EncryptedProtocolType = "WebSocket"
"#,
    );
    let config = resolve_default(&store).config;
    let channel = &config.channel_set[0];
    assert_eq!(
        channel.initialization_timeout,
        DEFAULT_INITIALIZATION_TIMEOUT_ENCRYPTED
    );
    let encrypted = channel.socket_config().unwrap().encrypted.clone().unwrap();
    assert_eq!(encrypted.protocol, EncryptedProtocol::WebSocket);
}

#[test]
fn lz4_without_threshold_gets_lz4_default() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
Channel = "A"

[ChannelGroup.ChannelList.A]
ChannelType = "Socket"
CompressionType = "Lz4"
"#,
    );
    let config = resolve_default(&store).config;
    assert_eq!(
        config.channel_set[0].compression_threshold,
        DEFAULT_COMPRESSION_THRESHOLD_LZ4
    );
}

#[test]
fn deprecated_keys_update_instance_and_warn_on_last_channel_only() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
Channel = "A,B"

[ChannelGroup.ChannelList.A]
ChannelType = "Socket"
ReconnectAttemptLimit = 3
XmlTraceToStdout = 1

[ChannelGroup.ChannelList.B]
ChannelType = "Socket"
ReconnectAttemptLimit = 9
"#,
    );
    let resolved = resolve_default(&store);
    // Only channel B (the last in the set) is consulted: last wins.
    assert_eq!(resolved.config.reconnect_attempt_limit, 9);
    assert!(!resolved.config.xml_trace_to_stdout);

    let warnings: Vec<_> = resolved
        .messages
        .messages()
        .iter()
        .filter(|m| m.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].text.contains("ReconnectAttemptLimit"));
}

#[test]
fn warm_standby_resolves_servers_into_separate_collection() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
WarmStandbyChannelSet = "WSB1"

[WarmStandbyGroup.WarmStandbyList.WSB1]
StartingActiveServer = "SrvA"
StandbyServerSet = "SrvB"
WarmStandbyMode = "ServiceBased"

[WarmStandbyServerInfoGroup.WarmStandbyServerInfoList.SrvA]
Channel = "A"
PerServiceNameSet = "FEED_A, FEED_B"

[WarmStandbyServerInfoGroup.WarmStandbyServerInfoList.SrvB]
Channel = "B"

[ChannelGroup.ChannelList.A]
ChannelType = "Socket"
Host = "active-host"

[ChannelGroup.ChannelList.B]
ChannelType = "Socket"
Host = "standby-host"
"#,
    );
    let config = resolve_default(&store).config;

    // No primary channels, but also no default synthesis: the warm-standby
    // set is non-empty.
    assert!(config.channel_set.is_empty());
    assert_eq!(config.warm_standby_set.len(), 1);

    let group = &config.warm_standby_set[0];
    assert_eq!(group.mode, WarmStandbyMode::ServiceBased);
    let starting = group.starting_active.as_ref().unwrap();
    assert_eq!(starting.channel.socket_config().unwrap().host, "active-host");
    assert_eq!(starting.per_service_names, vec!["FEED_A", "FEED_B"]);
    assert_eq!(group.standby_set.len(), 1);

    assert_eq!(config.channel_set_for_warm_standby.len(), 2);
}

#[test]
fn warm_standby_skips_missing_channel_references() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
WarmStandbyChannelSet = "WSB1"

[WarmStandbyGroup.WarmStandbyList.WSB1]
StartingActiveServer = "SrvA"

[WarmStandbyServerInfoGroup.WarmStandbyServerInfoList.SrvA]
Channel = "DoesNotExist"
"#,
    );
    let resolved = resolve_default(&store);
    let config = resolved.config;

    assert_eq!(config.warm_standby_set.len(), 1);
    assert!(config.warm_standby_set[0].starting_active.is_none());
    assert!(config.channel_set_for_warm_standby.is_empty());
    assert!(resolved
        .messages
        .messages()
        .iter()
        .any(|m| m.text.contains("DoesNotExist")));
}

#[test]
fn pipe_port_is_read_and_noted() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
PipePort = 9009
"#,
    );
    let resolved = resolve_default(&store);
    assert_eq!(resolved.config.pipe_port, 9009);
    assert!(resolved
        .messages
        .messages()
        .iter()
        .any(|m| m.text.contains("PipePort")));
}

#[test]
fn logger_subtree_resolves() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
Logger = "MainLogger"

[LoggerGroup.LoggerList.MainLogger]
LoggerType = "Stdout"
LoggerSeverity = "Warning"
IncludeDateInLoggerOutput = 1
"#,
    );
    let config = resolve_default(&store).config;
    assert_eq!(config.logger_config.logger_type, LoggerType::Stdout);
    assert_eq!(config.logger_config.min_severity, Severity::Warning);
    assert!(config.logger_config.include_date);
}

#[test]
fn missing_logger_node_warns_and_uses_defaults() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
Logger = "Ghost"
"#,
    );
    let resolved = resolve_default(&store);
    assert_eq!(resolved.config.logger_config.min_severity, Severity::Success);
    assert!(resolved
        .messages
        .messages()
        .iter()
        .any(|m| m.text.contains("Ghost")));
}

#[test]
fn user_host_forces_socket_type() {
    let store = store(
        r#"
[SessionGroup.SessionList.Default]
Channel = "E"

[ChannelGroup.ChannelList.E]
ChannelType = "Encrypted"
"#,
    );
    let overrides = CallOverrides {
        host: Some("direct-host".to_string()),
        ..CallOverrides::default()
    };
    let resolved = resolve(&store, &overrides, "Default", 1).unwrap();
    let socket = resolved.config.channel_set[0].socket_config().unwrap().clone();
    assert_eq!(socket.host, "direct-host");
    assert!(socket.encrypted.is_none());
}
