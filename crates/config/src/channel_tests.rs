// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn endpoint_defaults_fill_empty_socket() {
    let mut channel = ChannelConfig::socket("Channel");
    channel.apply_endpoint_defaults();
    let socket = channel.socket_config().unwrap();
    assert_eq!(socket.host, DEFAULT_HOST);
    assert_eq!(socket.service, DEFAULT_SERVICE);
}

#[test]
fn endpoint_defaults_keep_configured_values() {
    let mut channel = ChannelConfig::socket("Channel");
    {
        let socket = channel.socket_config_mut().unwrap();
        socket.host = "md.example.com".to_string();
    }
    channel.apply_endpoint_defaults();
    let socket = channel.socket_config().unwrap();
    assert_eq!(socket.host, "md.example.com");
    assert_eq!(socket.service, DEFAULT_SERVICE);
}

#[test]
fn session_managed_channels_stay_unaddressed() {
    let mut channel = ChannelConfig::socket("Cloud");
    channel.socket_config_mut().unwrap().session_management = true;
    channel.apply_endpoint_defaults();
    let socket = channel.socket_config().unwrap();
    assert!(socket.host.is_empty());
    assert!(socket.service.is_empty());
}

#[test]
fn multicast_has_no_socket_config() {
    let channel = ChannelConfig {
        kind: ChannelKind::ReliableMulticast(MulticastConfig::default()),
        ..ChannelConfig::socket("Mcast")
    };
    assert!(channel.socket_config().is_none());
}

#[test]
fn parse_compression_types() {
    assert_eq!(CompressionType::parse("Lz4"), Some(CompressionType::Lz4));
    assert_eq!(CompressionType::parse("Snappy"), None);
}
