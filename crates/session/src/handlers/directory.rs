// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source directory handler.
//!
//! Maintains the service-name catalog used for request routing and the
//! converter's synchronous name-to-id lookups.

use indexmap::IndexMap;
use tl_reactor::event::{ChannelId, DirectoryEvent, DirectoryEventKind};
use tl_reactor::{CallbackRet, DirectoryRequest};
use tracing::debug;

pub(crate) struct DirectoryHandler {
    request: DirectoryRequest,
    services: IndexMap<String, u16>,
    loaded: bool,
}

impl DirectoryHandler {
    pub fn new(request: DirectoryRequest, service_count_hint: u32) -> Self {
        let capacity = usize::try_from(service_count_hint).unwrap_or(0).min(65_536);
        Self {
            request,
            services: IndexMap::with_capacity(capacity),
            loaded: false,
        }
    }

    pub fn directory_request(&self) -> &DirectoryRequest {
        &self.request
    }

    /// True once the initial refresh arrived.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn service_id(&self, name: &str) -> Option<u16> {
        self.services.get(name).copied()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Drop the service catalog; teardown only.
    pub fn clear(&mut self) {
        self.services.clear();
        self.loaded = false;
    }

    pub fn process(&mut self, channel: ChannelId, event: DirectoryEvent) -> CallbackRet {
        for service in &event.services {
            self.services.insert(service.name.clone(), service.id);
        }
        if matches!(event.kind, DirectoryEventKind::Refresh) {
            self.loaded = true;
            debug!(%channel, services = self.services.len(), "directory loaded");
        }
        CallbackRet::Success
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
