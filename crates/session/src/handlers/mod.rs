// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol callback handlers.
//!
//! One handler of each kind lives for the whole session. The reactor
//! drives them synchronously through the session's event sink while the
//! user lock is held.

pub(crate) mod channel;
pub(crate) mod dictionary;
pub(crate) mod directory;
pub(crate) mod item;
pub(crate) mod login;
pub(crate) mod rest_log;

pub(crate) use channel::ChannelHandler;
pub(crate) use dictionary::DictionaryHandler;
pub(crate) use directory::DirectoryHandler;
pub(crate) use item::ItemHandler;
pub(crate) use login::LoginHandler;
pub(crate) use rest_log::RestLogHandler;

use tl_reactor::event::MessageKind;

use crate::client::{SessionClient, StreamEvent};

/// Route one stream event to the client method matching its kind.
pub(crate) fn deliver(client: &mut dyn SessionClient, event: &StreamEvent) {
    match event.message.kind {
        MessageKind::Refresh => client.on_refresh(event),
        MessageKind::Update => client.on_update(event),
        MessageKind::Status => client.on_status(event),
        MessageKind::Generic => client.on_generic(event),
        MessageKind::Ack => client.on_ack(event),
        MessageKind::Request | MessageKind::Post | MessageKind::Close => {}
    }
}
