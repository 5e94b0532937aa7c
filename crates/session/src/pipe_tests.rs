// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;

fn pipe() -> (mio::Poll, WakeupPipe) {
    let poll = mio::Poll::new().unwrap();
    let pipe = WakeupPipe::new(poll.registry(), Token(0)).unwrap();
    (poll, pipe)
}

#[test]
fn first_notify_writes_a_byte() {
    let (_poll, pipe) = pipe();
    assert!(pipe.notify());
    assert!(!pipe.notify());
    assert!(pipe.is_notified());
    assert_eq!(pipe.pending(), 2);
}

#[test]
fn last_drain_reads_the_byte() {
    let (_poll, pipe) = pipe();
    pipe.notify();
    pipe.notify();
    assert!(!pipe.drain());
    assert!(pipe.drain());
    assert!(!pipe.is_notified());
}

#[test]
fn drain_on_empty_is_a_no_op() {
    let (_poll, pipe) = pipe();
    assert!(!pipe.drain());
    assert_eq!(pipe.pending(), 0);
}

#[test]
fn notify_wakes_a_readiness_wait() {
    let (mut poll, pipe) = pipe();
    pipe.notify();

    let mut events = mio::Events::with_capacity(4);
    poll.poll(&mut events, Some(std::time::Duration::from_millis(500)))
        .unwrap();
    assert!(events.iter().any(|e| e.token() == Token(0)));
}

#[test]
fn burst_of_notifies_writes_exactly_one_byte() {
    let (mut poll, pipe) = pipe();
    let pipe = Arc::new(pipe);

    let mut joins = Vec::new();
    for _ in 0..8 {
        let pipe = Arc::clone(&pipe);
        joins.push(std::thread::spawn(move || {
            let mut writes = 0usize;
            for _ in 0..125 {
                if pipe.notify() {
                    writes += 1;
                }
            }
            writes
        }));
    }
    let writes: usize = joins.into_iter().map(|j| j.join().unwrap()).sum();
    assert_eq!(writes, 1, "only the 0 -> 1 transition may write");
    assert_eq!(pipe.pending(), 1000);

    let mut reads = 0usize;
    for _ in 0..1000 {
        if pipe.drain() {
            reads += 1;
        }
    }
    assert_eq!(reads, 1, "only the 1 -> 0 transition may read");
    assert_eq!(pipe.pending(), 0);

    // Nothing left in the pipe: a poll with zero timeout sees no readiness.
    let mut events = mio::Events::with_capacity(4);
    poll.poll(&mut events, Some(std::time::Duration::ZERO)).unwrap();
    assert!(events.is_empty());
}
