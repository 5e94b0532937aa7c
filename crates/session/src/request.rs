// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream registration requests.

/// Domain a stream request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamDomain {
    Login,
    Directory,
    Dictionary,
    MarketData,
}

/// Request handed to `register_client` / `reissue`. The payload is an
/// already-encoded request body; the session routes it without
/// interpretation.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub domain: StreamDomain,
    pub name: String,
    pub service_name: Option<String>,
    pub payload: Vec<u8>,
}

impl StreamRequest {
    pub fn market_data(name: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            domain: StreamDomain::MarketData,
            name: name.into(),
            service_name: Some(service_name.into()),
            payload: Vec::new(),
        }
    }

    pub fn login() -> Self {
        Self {
            domain: StreamDomain::Login,
            name: String::new(),
            service_name: None,
            payload: Vec::new(),
        }
    }
}
