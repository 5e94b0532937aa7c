// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatch loop: readiness wait, reactor dispatch, timer execution.
//!
//! One loop iteration waits on the wakeup pipe plus every reactor
//! descriptor, bounded by the caller's budget and the next timer deadline,
//! drains the pipe, drives the reactor under the user lock, performs
//! deferred work the callbacks parked, and runs due timers.

use std::io;
use std::time::Duration;

use mio::{Events, Poll, Token};
use tl_core::{ErrorCode, SessionError};
use tl_reactor::event::OAuthCredential;
use tl_reactor::{DispatchOpts, DispatchOutcome, ReactorError};
use tracing::warn;

use crate::router::route_error;
use crate::session::SessionShared;
use crate::sink::CoreSink;

pub(crate) const WAKEUP_TOKEN: Token = Token(0);
pub(crate) const REACTOR_TOKEN: Token = Token(1);

/// Consecutive reactor dispatch calls allowed per readiness cycle.
const DISPATCH_BURST_LIMIT: u32 = 10;

/// The poll and its event buffer, guarded by the dispatch lock.
pub(crate) struct Poller {
    pub poll: Poll,
    pub events: Events,
}

impl Poller {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(128),
        })
    }
}

/// Outcome of one `dispatch_loop` call.
pub(crate) enum LoopResult {
    /// The wake flag was raised: a callback of the watched kind fired.
    Dispatched,
    /// The budget elapsed without the wake flag being raised.
    TimedOut,
    /// A fatal error occurred. It has been logged and routed; `Some`
    /// carries it when no error client consumed it.
    Fatal(Option<SessionError>),
}

/// Which callback activity releases a `dispatch_loop` call.
///
/// Bring-up and the internal thread wake on any reactor callback; the
/// user-facing dispatch call only counts messages that reached a user
/// client.
#[derive(Clone, Copy)]
pub(crate) enum WakeFlag {
    EventReceived,
    MsgDispatched,
}

fn route_fatal(shared: &SessionShared, error: SessionError) -> LoopResult {
    match route_error(
        shared.logger.as_ref(),
        &shared.config.instance_name,
        shared.error_client.as_ref(),
        error,
    ) {
        Ok(()) => LoopResult::Fatal(None),
        Err(error) => LoopResult::Fatal(Some(error)),
    }
}

/// Run the dispatch loop until a message is dispatched to the user, the
/// budget elapses, or a fatal error occurs.
///
/// `timeout_us < 0` waits indefinitely, bounded by the next timer; `0`
/// polls; `> 0` waits up to that many microseconds.
pub(crate) fn dispatch_loop(
    shared: &SessionShared,
    poller: &mut Poller,
    timeout_us: i64,
    max_messages: u32,
    wake: WakeFlag,
) -> LoopResult {
    use std::sync::atomic::Ordering::SeqCst;

    let flag = match wake {
        WakeFlag::EventReceived => &shared.event_received,
        WakeFlag::MsgDispatched => &shared.msg_dispatched,
    };
    flag.store(false, SeqCst);
    let started = shared.clock.now();

    let deadline = if timeout_us >= 0 {
        Some(started + Duration::from_micros(timeout_us.unsigned_abs()))
    } else {
        None
    };

    loop {
        if shared.at_exit.load(SeqCst) {
            return LoopResult::TimedOut;
        }

        let now = shared.clock.now();
        // Re-bound the wait every iteration: a timer scheduled by the
        // previous cycle's callbacks tightens it immediately.
        let effective_deadline = match (deadline, shared.timers.next_deadline()) {
            (Some(budget), Some(timer)) => Some(budget.min(timer)),
            (Some(budget), None) => Some(budget),
            (None, timer) => timer,
        };
        let wait = effective_deadline.map(|at| at.saturating_duration_since(now));
        match poller.poll.poll(&mut poller.events, wait) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return route_fatal(
                    shared,
                    SessionError::System {
                        code: i64::from(e.raw_os_error().unwrap_or(-1)),
                        origin: "readiness wait".to_string(),
                        text: e.to_string(),
                    },
                );
            }
        }

        let mut pipe_readable = false;
        let mut reactor_ready = false;
        for event in poller.events.iter() {
            if event.token() == WAKEUP_TOKEN {
                pipe_readable = true;
            } else {
                reactor_ready = true;
            }
        }

        if pipe_readable {
            shared.pipe.drain();
        }

        if pipe_readable || reactor_ready {
            let opts = DispatchOpts { max_messages };
            let mut burst = 0;
            let outcome = loop {
                let outcome = dispatch_reactor_once(shared, &opts);
                burst += 1;
                match outcome {
                    Ok(DispatchOutcome::MorePending)
                        if !flag.load(SeqCst) && burst < DISPATCH_BURST_LIMIT =>
                    {
                        continue;
                    }
                    other => break other,
                }
            };

            if let Some(error) = flush_deferred(shared) {
                return LoopResult::Fatal(Some(error));
            }
            if let Err(e) = outcome {
                return route_fatal(
                    shared,
                    SessionError::invalid_usage(
                        format!(
                            "call to reactor dispatch failed. Internal sysError='{}' error location '{}' error text '{}'",
                            e.sys_error, e.location, e.text
                        ),
                        ErrorCode::ReactorFailure(e.code),
                    ),
                );
            }
            if flag.load(SeqCst) {
                return LoopResult::Dispatched;
            }
        }

        shared.timers.execute_due(shared.clock.now());
        if flag.load(SeqCst) {
            return LoopResult::Dispatched;
        }

        let now = shared.clock.now();
        match deadline {
            Some(at) => {
                if now >= at {
                    return LoopResult::TimedOut;
                }
            }
            // No caller budget: once a timer-bounded wait has elapsed, hand
            // control back so waiters can re-check state the timers changed.
            None => {
                if effective_deadline.is_some_and(|at| now >= at) {
                    return LoopResult::TimedOut;
                }
            }
        }
    }
}

/// One reactor dispatch call under the user lock.
fn dispatch_reactor_once(
    shared: &SessionShared,
    opts: &DispatchOpts,
) -> Result<DispatchOutcome, ReactorError> {
    let mut core = shared.core.lock();
    let Some(mut reactor) = core.reactor.take() else {
        return Ok(DispatchOutcome::Done);
    };
    let result = {
        let mut sink = CoreSink {
            core: &mut core,
            shared,
        };
        reactor.dispatch(opts, &mut sink)
    };
    core.reactor = Some(reactor);
    result
}

/// Perform work callbacks parked while the user lock was held: submit
/// renewed OAuth credentials and route JSON conversion errors. Returns the
/// first error no client consumed.
pub(crate) fn flush_deferred(shared: &SessionShared) -> Option<SessionError> {
    let credentials: Vec<OAuthCredential> = {
        let mut pending = shared.pending_credentials.lock();
        if pending.is_empty() {
            Vec::new()
        } else {
            std::mem::take(&mut *pending)
        }
    };
    if !credentials.is_empty() {
        let mut core = shared.core.lock();
        if let Some(reactor) = core.reactor.as_mut() {
            for credential in credentials {
                if let Err(e) = reactor.submit_oauth_credentials(&credential) {
                    warn!(error = %e, "failed to submit renewed credentials");
                }
            }
        }
    }

    let json_errors = {
        let mut core = shared.core.lock();
        std::mem::take(&mut core.deferred_json_errors)
    };
    let mut unrouted = None;
    for event in json_errors {
        let error = SessionError::JsonConverter {
            text: event.text,
            code: event.code,
            channel: event.channel.map(|c| c.0),
            provider: shared.provider_session,
        };
        if let Err(error) = route_error(
            shared.logger.as_ref(),
            &shared.config.instance_name,
            shared.error_client.as_ref(),
            error,
        ) {
            unrouted.get_or_insert(error);
        }
    }
    unrouted
}

/// Bounded teardown-time dispatch used to flush queued login closes. Runs
/// without the at-exit gate.
pub(crate) fn dispatch_flush(shared: &SessionShared, budget_us: i64, max_messages: u32) {
    let deadline = shared.clock.now() + Duration::from_micros(budget_us.unsigned_abs());
    let opts = DispatchOpts {
        max_messages: max_messages.max(1),
    };
    loop {
        match dispatch_reactor_once(shared, &opts) {
            Ok(DispatchOutcome::MorePending) if shared.clock.now() < deadline => continue,
            _ => break,
        }
    }
    let _ = flush_deferred(shared);
}
