// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-channel connection configuration.

use serde::{Deserialize, Serialize};

/// Default host used when a socket channel has no configured host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default service (port) used when a socket channel has no configured port.
pub const DEFAULT_SERVICE: &str = "14002";
/// Initialization timeout in seconds for plain connections.
pub const DEFAULT_INITIALIZATION_TIMEOUT: u32 = 5;
/// Encrypted connections get a longer initialization window.
pub const DEFAULT_INITIALIZATION_TIMEOUT_ENCRYPTED: u32 = 10;
/// Compression threshold applied when LZ4 is selected without an explicit
/// threshold.
pub const DEFAULT_COMPRESSION_THRESHOLD_LZ4: u32 = 300;
pub const DEFAULT_GUARANTEED_OUTPUT_BUFFERS: u32 = 100;
pub const DEFAULT_NUM_INPUT_BUFFERS: u32 = 100;
pub const DEFAULT_CONNECTION_PING_TIMEOUT_MS: u32 = 30_000;

/// Payload compression negotiated on a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionType {
    #[default]
    None,
    Zlib,
    Lz4,
}

impl CompressionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "None" => Some(Self::None),
            "Zlib" => Some(Self::Zlib),
            "Lz4" => Some(Self::Lz4),
            _ => None,
        }
    }
}

/// Protocol carried inside an encrypted connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptedProtocol {
    #[default]
    Socket,
    WebSocket,
    Http,
}

impl EncryptedProtocol {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Socket" => Some(Self::Socket),
            "WebSocket" => Some(Self::WebSocket),
            "Http" => Some(Self::Http),
            _ => None,
        }
    }
}

/// Encrypted-transport settings carried by a socket channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedConfig {
    pub protocol: EncryptedProtocol,
    pub security_protocol: u32,
    pub ssl_ca_store: String,
    /// Service-discovery location hint.
    pub location: String,
    pub service_discovery_retry_count: u32,
}

impl Default for EncryptedConfig {
    fn default() -> Self {
        Self {
            protocol: EncryptedProtocol::Socket,
            security_protocol: 0,
            ssl_ca_store: String::new(),
            location: "us-east-1".to_string(),
            service_discovery_retry_count: 3,
        }
    }
}

/// Proxy settings for a socket channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: String,
    pub user_name: String,
    pub password: String,
    pub domain: String,
}

/// TCP socket connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketConfig {
    pub host: String,
    pub service: String,
    pub tcp_nodelay: bool,
    /// When set, host and service may stay empty so the reactor can fill
    /// them in from service discovery.
    pub session_management: bool,
    pub proxy: ProxyConfig,
    pub object_name: String,
    pub encrypted: Option<EncryptedConfig>,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            service: String::new(),
            tcp_nodelay: true,
            session_management: false,
            proxy: ProxyConfig::default(),
            object_name: String::new(),
            encrypted: None,
        }
    }
}

/// Reliable multicast connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MulticastConfig {
    pub recv_address: String,
    pub recv_service: String,
    pub unicast_service: String,
    pub send_address: String,
    pub send_service: String,
    pub disconnect_on_gap: bool,
    pub packet_ttl: u32,
    pub hsm_interface: String,
    pub hsm_address: String,
    pub hsm_service: String,
    pub hsm_interval: u32,
}

/// Connection-type specific portion of a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChannelKind {
    Socket(SocketConfig),
    ReliableMulticast(MulticastConfig),
}

/// Resolved configuration for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub interface_name: String,
    pub compression_type: CompressionType,
    pub compression_threshold: u32,
    pub guaranteed_output_buffers: u32,
    pub num_input_buffers: u32,
    pub connection_ping_timeout_ms: u32,
    /// Seconds allowed for transport initialization.
    pub initialization_timeout: u32,
    pub sys_recv_buf_size: u32,
    pub sys_send_buf_size: u32,
    pub high_water_mark: u32,
    pub kind: ChannelKind,
}

impl ChannelConfig {
    /// A socket channel with defaults appropriate for `name`.
    pub fn socket(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface_name: String::new(),
            compression_type: CompressionType::None,
            compression_threshold: 0,
            guaranteed_output_buffers: DEFAULT_GUARANTEED_OUTPUT_BUFFERS,
            num_input_buffers: DEFAULT_NUM_INPUT_BUFFERS,
            connection_ping_timeout_ms: DEFAULT_CONNECTION_PING_TIMEOUT_MS,
            initialization_timeout: DEFAULT_INITIALIZATION_TIMEOUT,
            sys_recv_buf_size: 0,
            sys_send_buf_size: 0,
            high_water_mark: 0,
            kind: ChannelKind::Socket(SocketConfig::default()),
        }
    }

    pub fn socket_config(&self) -> Option<&SocketConfig> {
        match &self.kind {
            ChannelKind::Socket(socket) => Some(socket),
            ChannelKind::ReliableMulticast(_) => None,
        }
    }

    pub fn socket_config_mut(&mut self) -> Option<&mut SocketConfig> {
        match &mut self.kind {
            ChannelKind::Socket(socket) => Some(socket),
            ChannelKind::ReliableMulticast(_) => None,
        }
    }

    /// Fill in default host and service for plain socket channels left
    /// unaddressed by configuration. Session-managed channels stay empty so
    /// service discovery can supply the endpoint.
    pub fn apply_endpoint_defaults(&mut self) {
        if let ChannelKind::Socket(socket) = &mut self.kind {
            if !socket.session_management {
                if socket.host.is_empty() {
                    socket.host = DEFAULT_HOST.to_string();
                }
                if socket.service.is_empty() {
                    socket.service = DEFAULT_SERVICE.to_string();
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
