// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-thread wakeup pipe.
//!
//! An anonymous pipe wrapped by a counter: at most one byte is ever in the
//! pipe no matter how many threads call [`WakeupPipe::notify`]. Without the
//! coalescing, sustained user traffic could fill the pipe buffer and block
//! notifiers.

use std::io::{self, Read, Write};

use mio::unix::pipe;
use mio::{Interest, Registry, Token};
use parking_lot::Mutex;

struct PipeState {
    write_count: u64,
    sender: pipe::Sender,
    receiver: pipe::Receiver,
}

/// Readiness-pollable wakeup primitive.
pub struct WakeupPipe {
    state: Mutex<PipeState>,
}

impl WakeupPipe {
    /// Create the pipe and register its readable end with `registry`.
    pub fn new(registry: &Registry, token: Token) -> io::Result<Self> {
        let (sender, mut receiver) = pipe::new()?;
        registry.register(&mut receiver, token, Interest::READABLE)?;
        Ok(Self {
            state: Mutex::new(PipeState {
                write_count: 0,
                sender,
                receiver,
            }),
        })
    }

    /// Record a pending wakeup; writes one byte only on the 0 -> 1
    /// transition. Returns whether a byte was written.
    pub fn notify(&self) -> bool {
        let mut state = self.state.lock();
        state.write_count += 1;
        if state.write_count == 1 {
            let _ = (&state.sender).write(&[b'0']);
            true
        } else {
            false
        }
    }

    /// Consume one pending wakeup; reads the byte only on the 1 -> 0
    /// transition. Returns whether a byte was read.
    pub fn drain(&self) -> bool {
        let mut state = self.state.lock();
        if state.write_count == 0 {
            return false;
        }
        state.write_count -= 1;
        if state.write_count == 0 {
            let mut buf = [0u8; 1];
            let _ = (&state.receiver).read(&mut buf);
            true
        } else {
            false
        }
    }

    /// True when at least one wakeup is pending.
    pub fn is_notified(&self) -> bool {
        self.state.lock().write_count > 0
    }

    /// Number of pending wakeups.
    pub fn pending(&self) -> u64 {
        self.state.lock().write_count
    }

    /// Remove the readable end from the readiness set.
    pub fn deregister(&self, registry: &Registry) -> io::Result<()> {
        let mut state = self.state.lock();
        registry.deregister(&mut state.receiver)
    }
}

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;
