//! Beat boundary wake-up primitive.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Single-slot, auto-clearing wake condition raised by the clock once per
/// beat and consumed by one worker stream.
///
/// At most one wake is ever pending: repeated `signal()` calls before the
/// consumer gets around to waiting collapse into a single pending state.
/// Beats are dropped, not queued, when the consumer falls behind. A worker
/// that is still rendering past the next beat boundary therefore skips that
/// boundary instead of receiving a backlog of stale wakes, which would pile
/// up unscheduled notes.
#[derive(Default)]
pub struct BeatSignal {
    pending: Mutex<bool>,
    cond: Condvar,
}

impl BeatSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a beat boundary. Idempotent while unconsumed.
    pub fn signal(&self) {
        let mut pending = self.pending.lock().unwrap();
        *pending = true;
        self.cond.notify_one();
    }

    /// Blocks until a beat boundary has been signaled or `timeout` elapses.
    ///
    /// Clears the pending state before returning, so each signal wakes the
    /// consumer exactly once. Returns false on timeout. The timeout is
    /// always bounded so callers stay responsive to cancellation even if no
    /// further beat ever arrives.
    pub fn wait_and_consume(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock().unwrap();
        while !*pending {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, result) = self.cond.wait_timeout(pending, deadline - now).unwrap();
            pending = guard;
            if result.timed_out() && !*pending {
                return false;
            }
        }
        *pending = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn signal_then_wait_consumes() {
        let signal = BeatSignal::new();
        signal.signal();
        assert!(signal.wait_and_consume(Duration::from_millis(10)));
        // Consumed: a second wait must time out.
        assert!(!signal.wait_and_consume(Duration::from_millis(10)));
    }

    #[test]
    fn repeated_signals_collapse_to_one() {
        let signal = BeatSignal::new();
        signal.signal();
        signal.signal();
        signal.signal();
        assert!(signal.wait_and_consume(Duration::from_millis(10)));
        assert!(!signal.wait_and_consume(Duration::from_millis(10)));
    }

    #[test]
    fn wait_times_out_without_signal() {
        let signal = BeatSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_and_consume(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn signal_wakes_a_blocked_waiter() {
        let signal = Arc::new(BeatSignal::new());
        let waiter_signal = Arc::clone(&signal);

        let waiter = thread::spawn(move || waiter_signal.wait_and_consume(Duration::from_secs(2)));

        thread::sleep(Duration::from_millis(20));
        signal.signal();
        assert!(waiter.join().unwrap());
    }
}
