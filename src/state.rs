use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared by every thread in a run.
///
/// The transition is monotone: once stopping, always stopping. Only the
/// transport controller writes it; clock and worker threads read it at the
/// top of each loop iteration. A clone of the handle is passed to each
/// thread at spawn time.
#[derive(Clone, Default)]
pub struct RunState {
    stopping: Arc<AtomicBool>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stopping.store(true, Ordering::SeqCst);
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }
}

/// Count of clock pulses emitted so far.
///
/// Incremented by exactly one per pulse, by the clock thread only; readable
/// from anywhere.
#[derive(Clone, Default)]
pub struct TickCounter {
    count: Arc<AtomicU64>,
}

impl TickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one emitted pulse and returns the total so far.
    pub fn advance(&self) -> u64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn value(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}
