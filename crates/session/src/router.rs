// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error routing policy.
//!
//! Every error takes exactly one path to the user: the typed callback of a
//! registered error client, or the `Err` return of the call that observed
//! it. In both cases the error is logged first, severity permitting.

use parking_lot::Mutex;
use tl_core::{SessionError, Severity};
use tl_reactor::event::ChannelId;

use crate::client::ErrorClient;
use crate::logger::SessionLogger;

/// Deliver `error` through the client when one is registered; otherwise
/// hand it back for the caller to return.
pub(crate) fn route_error(
    logger: &SessionLogger,
    instance_name: &str,
    error_client: Option<&Mutex<Box<dyn ErrorClient>>>,
    error: SessionError,
) -> Result<(), SessionError> {
    if logger.enabled(Severity::Error) {
        logger.log(instance_name, Severity::Error, &error.to_string());
    }

    let Some(client) = error_client else {
        return Err(error);
    };
    let mut client = client.lock();
    match &error {
        SessionError::InvalidUsage { text, code } => client.on_invalid_usage(text, *code),
        SessionError::InvalidHandle { handle, text } => client.on_invalid_handle(*handle, text),
        SessionError::MemoryExhaustion(text) => client.on_memory_exhaustion(text),
        SessionError::JsonConverter {
            text,
            code,
            channel,
            provider,
        } => client.on_json_converter(text, *code, channel.map(ChannelId), *provider),
        SessionError::System { code, origin, text } => client.on_system_error(*code, origin, text),
        SessionError::InaccessibleLogFile { filename, text } => {
            client.on_inaccessible_log_file(filename, text)
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
