// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tl_reactor::event::{MessageKind, StreamMessage};

fn event(name: &str, complete: bool) -> DictionaryEvent {
    DictionaryEvent {
        name: name.to_string(),
        complete,
        message: StreamMessage::new(3, MessageKind::Refresh, Vec::new()),
    }
}

#[test]
fn multi_part_refresh_completes_on_final_part() {
    let mut handler = DictionaryHandler::new();
    handler.process(ChannelId(1), event("RWFFld", false));
    assert!(!handler.is_loaded());

    handler.process(ChannelId(1), event("RWFFld", true));
    assert!(handler.is_loaded());
    assert_eq!(handler.names(), ["RWFFld"]);
}

#[test]
fn clear_forgets_loaded_dictionaries() {
    let mut handler = DictionaryHandler::new();
    handler.process(ChannelId(1), event("RWFFld", true));
    assert!(handler.is_loaded());

    handler.clear();
    assert!(!handler.is_loaded());
    assert!(handler.names().is_empty());
}
