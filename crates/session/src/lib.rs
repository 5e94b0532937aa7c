// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tl-session: the Tickline session runtime core
//!
//! The long-lived [`Session`] owns a transport reactor, drives connections
//! to upstream market-data systems, routes protocol events to handlers,
//! multiplexes user requests with reactor I/O on a single event loop, and
//! enforces lifecycle, timeout, and warm-standby policy.

pub mod client;
pub mod logger;
pub mod pipe;
pub mod request;
pub mod session;

mod dispatch;
mod handlers;
mod registry;
mod router;
mod sink;

pub use client::{
    ClientClosure, ErrorClient, OAuthClient, RenewalEvent, RestLogClient, RestLogMessage,
    SessionClient, StreamEvent,
};
pub use logger::SessionLogger;
pub use pipe::WakeupPipe;
pub use registry::active_sessions;
pub use request::{StreamDomain, StreamRequest};
pub use session::{CredentialsPort, DispatchResult, ReactorFactory, Session, SessionBuilder};
