// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional REST logging handler.

use tl_reactor::event::RestLogEvent;
use tl_reactor::CallbackRet;

use crate::client::{ClientClosure, RestLogClient, RestLogMessage};

pub(crate) struct RestLogHandler {
    client: Box<dyn RestLogClient>,
    closure: Option<ClientClosure>,
}

impl RestLogHandler {
    pub fn new(client: Box<dyn RestLogClient>, closure: Option<ClientClosure>) -> Self {
        Self { client, closure }
    }

    pub fn process(&mut self, event: RestLogEvent) -> CallbackRet {
        let message = RestLogMessage {
            message: event.message,
            closure: self.closure.clone(),
        };
        self.client.on_rest_log(&message);
        CallbackRet::Success
    }
}

#[cfg(test)]
#[path = "rest_log_tests.rs"]
mod tests;
