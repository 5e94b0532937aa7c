// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel handler.
//!
//! Opens the configured channels (or warm-standby groups) through the
//! reactor, tracks their sockets in the readiness set, and records which
//! channel is active for stream submission.

use std::os::fd::RawFd;

use mio::unix::SourceFd;
use mio::{Interest, Registry, Token};
use tl_config::ActiveConfig;
use tl_core::{ErrorCode, SessionError};
use tl_reactor::event::{ChannelEvent, ChannelEventKind, ChannelId, OAuthCredential};
use tl_reactor::{CallbackRet, ChannelOpenRequest, DirectoryRequest, LoginRequest, Reactor};
use tracing::{debug, warn};

/// Tokens below this value are reserved for the pipe and the reactor.
const CHANNEL_TOKEN_BASE: usize = 2;

pub(crate) fn channel_token(id: ChannelId) -> Token {
    Token(CHANNEL_TOKEN_BASE + usize::try_from(id.0).unwrap_or(usize::MAX - CHANNEL_TOKEN_BASE))
}

pub(crate) struct ChannelEntry {
    pub id: ChannelId,
    pub name: String,
    pub socket: Option<RawFd>,
    pub up: bool,
    pub in_oauth_callback: bool,
}

#[derive(Default)]
pub(crate) struct ChannelHandler {
    entries: Vec<ChannelEntry>,
}

impl ChannelHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open every configured channel. Warm-standby groups connect through
    /// their starting-active server; groups left without one after
    /// resolution are skipped.
    pub fn open_channels(
        &mut self,
        reactor: &mut dyn Reactor,
        config: &ActiveConfig,
        login_request: &LoginRequest,
        directory_request: &DirectoryRequest,
        oauth: Option<&OAuthCredential>,
    ) -> Result<(), SessionError> {
        for group in &config.warm_standby_set {
            let Some(starting) = &group.starting_active else {
                warn!(group = %group.name, "warm standby group has no starting active server");
                continue;
            };
            let request = ChannelOpenRequest {
                channel: starting.channel.clone(),
                warm_standby: Some(group.clone()),
                login_request: login_request.clone(),
                directory_request: directory_request.clone(),
                oauth: oauth.cloned(),
                reconnect_attempt_limit: config.reconnect_attempt_limit,
                reconnect_min_delay_ms: config.reconnect_min_delay_ms,
                reconnect_max_delay_ms: config.reconnect_max_delay_ms,
            };
            self.connect(reactor, request, &group.name)?;
        }

        for channel in &config.channel_set {
            let request = ChannelOpenRequest {
                channel: channel.clone(),
                warm_standby: None,
                login_request: login_request.clone(),
                directory_request: directory_request.clone(),
                oauth: oauth.cloned(),
                reconnect_attempt_limit: config.reconnect_attempt_limit,
                reconnect_min_delay_ms: config.reconnect_min_delay_ms,
                reconnect_max_delay_ms: config.reconnect_max_delay_ms,
            };
            self.connect(reactor, request, &channel.name)?;
        }
        Ok(())
    }

    fn connect(
        &mut self,
        reactor: &mut dyn Reactor,
        request: ChannelOpenRequest,
        name: &str,
    ) -> Result<(), SessionError> {
        let id = reactor.connect(request).map_err(|e| {
            SessionError::invalid_usage(
                format!("failed to open channel [{name}]: {e}"),
                ErrorCode::ReactorFailure(e.code),
            )
        })?;
        self.entries.push(ChannelEntry {
            id,
            name: name.to_string(),
            socket: None,
            up: false,
            in_oauth_callback: false,
        });
        Ok(())
    }

    /// Process a channel lifecycle event, keeping the readiness set in sync
    /// with the channel's socket.
    pub fn process(&mut self, event: ChannelEvent, registry: &Registry) -> CallbackRet {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == event.channel) else {
            warn!(channel = %event.channel, "event for unknown channel");
            return CallbackRet::Success;
        };

        match event.kind {
            ChannelEventKind::Opened => {
                debug!(channel = %entry.name, "channel opened");
            }
            ChannelEventKind::Up => {
                entry.up = true;
                entry.socket = event.socket;
                if let Some(fd) = entry.socket {
                    let _ = registry.register(
                        &mut SourceFd(&fd),
                        channel_token(entry.id),
                        Interest::READABLE,
                    );
                }
                debug!(channel = %entry.name, "channel up");
            }
            ChannelEventKind::Ready => {
                debug!(channel = %entry.name, "channel ready");
            }
            ChannelEventKind::Down { text } => {
                entry.up = false;
                if let Some(fd) = entry.socket.take() {
                    let _ = registry.deregister(&mut SourceFd(&fd));
                }
                warn!(channel = %entry.name, text, "channel down");
            }
            ChannelEventKind::FdChange { old, new } => {
                let _ = registry.deregister(&mut SourceFd(&old));
                let _ = registry.register(
                    &mut SourceFd(&new),
                    channel_token(entry.id),
                    Interest::READABLE,
                );
                entry.socket = Some(new);
            }
        }
        CallbackRet::Success
    }

    /// The channel user streams ride on: the first channel that came up,
    /// else the first configured.
    pub fn active_channel(&self) -> Option<ChannelId> {
        self.entries
            .iter()
            .find(|e| e.up)
            .or_else(|| self.entries.first())
            .map(|e| e.id)
    }

    pub fn channel_ids(&self) -> Vec<ChannelId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn set_in_oauth_callback(&mut self, channel: Option<ChannelId>, value: bool) {
        match channel {
            Some(id) => {
                if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
                    entry.in_oauth_callback = value;
                }
            }
            None => {
                // No channel named: mark the active one.
                if let Some(id) = self.active_channel() {
                    self.set_in_oauth_callback(Some(id), value);
                }
            }
        }
    }

    pub fn in_oauth_callback(&self, channel: ChannelId) -> bool {
        self.entries
            .iter()
            .find(|e| e.id == channel)
            .is_some_and(|e| e.in_oauth_callback)
    }

    /// Close all channels and drop their sockets from the readiness set.
    pub fn close_all(&mut self, reactor: &mut dyn Reactor, registry: &Registry) {
        for entry in self.entries.drain(..) {
            if let Some(fd) = entry.socket {
                let _ = registry.deregister(&mut SourceFd(&fd));
            }
            if let Err(e) = reactor.close_channel(entry.id) {
                warn!(channel = %entry.name, error = %e, "failed to close channel");
            }
        }
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
