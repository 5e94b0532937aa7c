// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Warm-standby topology configuration.
//!
//! A warm-standby group names one starting active server and an ordered set
//! of standby servers. Each server refers to a channel by name; referenced
//! channels that do not exist in the channel catalog are skipped rather
//! than failing the whole resolve.

use serde::{Deserialize, Serialize};

use crate::channel::ChannelConfig;

/// Failover coordination mode for a warm-standby group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarmStandbyMode {
    #[default]
    LoginBased,
    ServiceBased,
}

impl WarmStandbyMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LoginBased" => Some(Self::LoginBased),
            "ServiceBased" => Some(Self::ServiceBased),
            _ => None,
        }
    }
}

/// One server participating in a warm-standby group.
///
/// The channel configuration is held by value; warm-standby channels are
/// never shared with the primary channel set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmStandbyServerInfo {
    pub name: String,
    pub channel: ChannelConfig,
    /// Optional allowlist of service names this server may carry.
    pub per_service_names: Vec<String>,
}

/// Resolved configuration for one warm-standby group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmStandbyChannelConfig {
    pub name: String,
    /// Absent when the configured starting-active server referenced a
    /// channel missing from the catalog.
    pub starting_active: Option<WarmStandbyServerInfo>,
    pub standby_set: Vec<WarmStandbyServerInfo>,
    pub mode: WarmStandbyMode,
}
