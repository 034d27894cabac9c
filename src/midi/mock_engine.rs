use crate::midi::{MidiEngine, MidiError, MidiMessage, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// A message recorded by the mock engine, with the time it was sent.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub at: Instant,
    pub msg: MidiMessage,
}

/// Recording MIDI engine for tests. Clones share the same message log, so a
/// copy can be kept for assertions after the engine is handed to a sink.
#[derive(Clone, Default)]
pub struct MockMidiEngine {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing: Arc<AtomicBool>,
}

impl MockMidiEngine {
    /// Signature-compatible with [`MidirEngine::new`] so the engine can
    /// stand in behind the `test-mock` feature.
    ///
    /// [`MidirEngine::new`]: crate::midi::MidirEngine::new
    pub fn new(_port_name: &str) -> Result<Self> {
        Ok(Self::default())
    }

    /// Mock counterpart of [`MidirEngine::list_ports`].
    ///
    /// [`MidirEngine::list_ports`]: crate::midi::MidirEngine::list_ports
    pub fn list_ports() -> Vec<String> {
        vec!["Mock Port 1".to_string(), "Mock Port 2".to_string()]
    }

    /// Handle onto the shared log of everything sent through this engine.
    pub fn sent_log(&self) -> Arc<Mutex<Vec<SentMessage>>> {
        Arc::clone(&self.sent)
    }

    /// Snapshot of the messages sent so far, without timestamps.
    pub fn messages(&self) -> Vec<MidiMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.msg.clone())
            .collect()
    }

    /// When set, every subsequent send fails with a send error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl MidiEngine for MockMidiEngine {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MidiError::SendError("mock device disconnected".into()));
        }
        self.sent.lock().unwrap().push(SentMessage {
            at: Instant::now(),
            msg,
        });
        Ok(())
    }
}
