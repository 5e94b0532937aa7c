//! The wakeup pipe keeps at most one byte in flight under bursts.

use std::sync::Arc;

use mio::Token;
use tl_session::WakeupPipe;

#[test]
fn thousand_notifies_from_eight_threads_write_one_byte() {
    let mut poll = mio::Poll::new().unwrap();
    let pipe = Arc::new(WakeupPipe::new(poll.registry(), Token(0)).unwrap());

    let mut joins = Vec::new();
    for _ in 0..8 {
        let pipe = Arc::clone(&pipe);
        joins.push(std::thread::spawn(move || {
            (0..125).filter(|_| pipe.notify()).count()
        }));
    }
    let writes: usize = joins.into_iter().map(|j| j.join().unwrap()).sum();

    assert_eq!(writes, 1, "exactly one byte written across the burst");
    assert_eq!(pipe.pending(), 1000);

    let reads = (0..1000).filter(|_| pipe.drain()).count();
    assert_eq!(reads, 1, "exactly one byte read while draining to zero");
    assert_eq!(pipe.pending(), 0);
    assert!(!pipe.is_notified());

    // The pipe is empty again: nothing shows up as readable.
    let mut events = mio::Events::with_capacity(4);
    poll.poll(&mut events, Some(std::time::Duration::ZERO)).unwrap();
    assert!(events.is_empty());
}

#[test]
fn interleaved_notify_drain_keeps_invariant() {
    let poll = mio::Poll::new().unwrap();
    let pipe = WakeupPipe::new(poll.registry(), Token(0)).unwrap();

    for round in 0..100 {
        pipe.notify();
        pipe.notify();
        assert!(pipe.is_notified(), "round {round}");
        pipe.drain();
        pipe.drain();
        assert!(!pipe.is_notified(), "round {round}");
    }
}
