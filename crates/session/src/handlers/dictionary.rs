// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dictionary handler. Tracks completeness of the default dictionary the
//! converter is initialized with.

use tl_reactor::event::{ChannelId, DictionaryEvent};
use tl_reactor::CallbackRet;
use tracing::debug;

#[derive(Default)]
pub(crate) struct DictionaryHandler {
    names: Vec<String>,
    loaded: bool,
}

impl DictionaryHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a complete dictionary refresh arrived.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Forget all loaded dictionaries; teardown only.
    pub fn clear(&mut self) {
        self.names.clear();
        self.loaded = false;
    }

    pub fn process(&mut self, channel: ChannelId, event: DictionaryEvent) -> CallbackRet {
        if !self.names.iter().any(|n| n == &event.name) {
            self.names.push(event.name.clone());
        }
        if event.complete {
            self.loaded = true;
            debug!(%channel, name = %event.name, "dictionary loaded");
        }
        CallbackRet::Success
    }
}

#[cfg(test)]
#[path = "dictionary_tests.rs"]
mod tests;
