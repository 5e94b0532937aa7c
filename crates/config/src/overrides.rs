// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-call configuration overrides.
//!
//! These correspond to values a user supplies through setter calls on the
//! session configuration object rather than through the file or
//! programmatic trees. They take precedence over both.

/// User-specified overrides applied on top of the configuration layers.
///
/// A `Some("")` port means "use the default service for the port the user
/// asked to clear", mirroring the setter semantics of the public facade.
#[derive(Debug, Default, Clone)]
pub struct CallOverrides {
    pub host: Option<String>,
    pub port: Option<String>,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<String>,
    pub proxy_user_name: Option<String>,
    pub proxy_password: Option<String>,
    pub proxy_domain: Option<String>,
    pub object_name: Option<String>,
    pub security_protocol: Option<u32>,
    pub ssl_ca_store: Option<String>,
    pub lib_ssl_name: Option<String>,
    pub lib_crypto_name: Option<String>,
    pub lib_curl_name: Option<String>,
    pub service_discovery_url: Option<String>,
    pub token_service_url_v1: Option<String>,
    pub token_service_url_v2: Option<String>,
}

impl CallOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}
