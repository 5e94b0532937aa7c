// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session's event sink.
//!
//! The reactor invokes these callbacks synchronously from inside a
//! dispatch call, while the dispatching thread holds the user lock. Each
//! callback marks the event-received flag, routes to the owning handler,
//! and returns the handler's sentinel unchanged.

use std::sync::atomic::Ordering::SeqCst;

use tl_reactor::event::{
    ChannelEvent, ChannelId, DictionaryEvent, DirectoryEvent, ItemEvent, JsonConversionError,
    LoginEvent, OAuthRenewalEvent, RestLogEvent,
};
use tl_reactor::{CallbackRet, EventSink};

use crate::client::RenewalEvent;
use crate::session::{Core, SessionShared};

pub(crate) struct CoreSink<'a> {
    pub core: &'a mut Core,
    pub shared: &'a SessionShared,
}

impl EventSink for CoreSink<'_> {
    fn on_channel_event(&mut self, event: ChannelEvent) -> CallbackRet {
        self.shared.event_received.store(true, SeqCst);
        self.core.channels.process(event, &self.shared.poll_registry)
    }

    fn on_login_event(&mut self, channel: ChannelId, event: LoginEvent) -> CallbackRet {
        self.shared.event_received.store(true, SeqCst);
        let core = &mut *self.core;
        let (ret, dispatched) = core.login.process(&mut core.state, channel, event);
        if dispatched > 0 {
            self.shared.msg_dispatched.store(true, SeqCst);
        }
        ret
    }

    fn on_directory_event(&mut self, channel: ChannelId, event: DirectoryEvent) -> CallbackRet {
        self.shared.event_received.store(true, SeqCst);
        self.core.directory.process(channel, event)
    }

    fn on_dictionary_event(&mut self, channel: ChannelId, event: DictionaryEvent) -> CallbackRet {
        self.shared.event_received.store(true, SeqCst);
        self.core.dictionary.process(channel, event)
    }

    fn on_item_event(&mut self, channel: ChannelId, event: ItemEvent) -> CallbackRet {
        self.shared.event_received.store(true, SeqCst);
        let (ret, dispatched) = self.core.items.process(channel, event);
        if dispatched {
            self.shared.msg_dispatched.store(true, SeqCst);
        }
        ret
    }

    /// Credential renewal allows re-entrant submission: the in-callback
    /// marker is visible to `submit_oauth_credentials` on this thread, so
    /// the user callback can hand credentials back without re-acquiring
    /// the user lock.
    fn on_oauth_renewal(&mut self, event: OAuthRenewalEvent) -> CallbackRet {
        self.shared.in_oauth_callback.store(true, SeqCst);
        self.core.channels.set_in_oauth_callback(event.channel, true);

        if let Some(client) = self.core.oauth_client.as_mut() {
            let renewal = RenewalEvent {
                channel: event.channel,
                closure: self.core.admin_closure.clone(),
            };
            client.on_credential_renewal(&renewal);
        }

        self.core.channels.set_in_oauth_callback(event.channel, false);
        self.shared.in_oauth_callback.store(false, SeqCst);
        CallbackRet::Success
    }

    /// The reactor holds the user lock here; routing must not happen under
    /// it. Park the error for the dispatch loop to route after release.
    fn on_json_conversion_error(&mut self, event: JsonConversionError) -> CallbackRet {
        self.core.deferred_json_errors.push(event);
        CallbackRet::Success
    }

    fn on_rest_log(&mut self, event: RestLogEvent) -> CallbackRet {
        self.shared.event_received.store(true, SeqCst);
        match self.core.rest_log.as_mut() {
            Some(handler) => handler.process(event),
            None => CallbackRet::Success,
        }
    }

    fn service_name_to_id(&mut self, name: &str) -> Option<u16> {
        self.core.directory.service_id(name)
    }
}
