// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-ordered one-shot and repeating timers.
//!
//! The wheel is driven externally: the dispatch loop bounds its readiness
//! wait with [`TimerWheel::next_deadline`] and calls
//! [`TimerWheel::execute_due`] once per iteration. Cancellation flips a flag
//! and leaves the entry in place until the loop expires it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Callback invoked when a timer fires.
pub type TimerCallback = Box<dyn FnMut() + Send>;

/// Identifier returned by [`TimerWheel::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Entry {
    handle: TimerHandle,
    repeat: Option<Duration>,
    cancelled: bool,
    callback: TimerCallback,
}

#[derive(Default)]
struct Inner {
    /// Keyed by (deadline, insertion sequence) so same-instant timers fire
    /// in insertion order.
    entries: BTreeMap<(Instant, u64), Entry>,
    index: HashMap<u64, (Instant, u64)>,
    /// Handles removed for firing in the current pass; cancel() records
    /// them here so a repeating timer can cancel itself from its callback.
    in_flight: HashSet<u64>,
    cancelled_in_flight: HashSet<u64>,
    next_seq: u64,
    next_handle: u64,
}

/// Ordered collection of pending timers.
pub struct TimerWheel {
    inner: Mutex<Inner>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Schedule a one-shot timer `delay` after `now`.
    pub fn schedule(
        &self,
        now: Instant,
        delay: Duration,
        callback: TimerCallback,
    ) -> TimerHandle {
        self.insert(now + delay, None, callback)
    }

    /// Schedule a repeating timer firing every `period` after `now`.
    pub fn schedule_repeating(
        &self,
        now: Instant,
        period: Duration,
        callback: TimerCallback,
    ) -> TimerHandle {
        self.insert(now + period, Some(period), callback)
    }

    fn insert(
        &self,
        fire_at: Instant,
        repeat: Option<Duration>,
        callback: TimerCallback,
    ) -> TimerHandle {
        let mut inner = self.inner.lock();
        inner.next_handle += 1;
        inner.next_seq += 1;
        let handle = TimerHandle(inner.next_handle);
        let key = (fire_at, inner.next_seq);
        inner.entries.insert(
            key,
            Entry {
                handle,
                repeat,
                cancelled: false,
                callback,
            },
        );
        inner.index.insert(handle.0, key);
        handle
    }

    /// Cancel a timer. Idempotent; cancelling an expired handle is a no-op.
    pub fn cancel(&self, handle: TimerHandle) {
        let mut inner = self.inner.lock();
        if let Some(key) = inner.index.get(&handle.0).copied() {
            if let Some(entry) = inner.entries.get_mut(&key) {
                entry.cancelled = true;
            }
        } else if inner.in_flight.contains(&handle.0) {
            inner.cancelled_in_flight.insert(handle.0);
        }
    }

    /// Fire all timers due at `now` in non-decreasing deadline order.
    ///
    /// Each entry is removed before its callback runs, so callbacks may
    /// re-enter `schedule`; timers scheduled or repeated during a pass never
    /// fire within the same pass. Returns the number of callbacks invoked.
    pub fn execute_due(&self, now: Instant) -> usize {
        let due: Vec<((Instant, u64), Entry)> = {
            let mut inner = self.inner.lock();
            let keys: Vec<(Instant, u64)> = inner
                .entries
                .range(..=(now, u64::MAX))
                .map(|(key, _)| *key)
                .collect();
            let mut due = Vec::with_capacity(keys.len());
            for key in keys {
                if let Some(entry) = inner.entries.remove(&key) {
                    inner.index.remove(&entry.handle.0);
                    if !entry.cancelled {
                        inner.in_flight.insert(entry.handle.0);
                        due.push((key, entry));
                    }
                }
            }
            due
        };

        let mut fired = 0;
        for ((fire_at, _), mut entry) in due {
            (entry.callback)();
            fired += 1;

            let mut inner = self.inner.lock();
            inner.in_flight.remove(&entry.handle.0);
            let self_cancelled = inner.cancelled_in_flight.remove(&entry.handle.0);
            if let Some(period) = entry.repeat {
                if !self_cancelled {
                    inner.next_seq += 1;
                    let key = (fire_at + period, inner.next_seq);
                    inner.index.insert(entry.handle.0, key);
                    inner.entries.insert(key, entry);
                }
            }
        }
        fired
    }

    /// Deadline of the earliest live timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        let inner = self.inner.lock();
        inner
            .entries
            .iter()
            .filter(|(_, entry)| !entry.cancelled)
            .map(|((fire_at, _), _)| *fire_at)
            .next()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

impl Default for TimerWheel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
