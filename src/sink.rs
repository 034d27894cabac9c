//! Serialized wrapper around one physical MIDI output connection.

use crate::midi::{MidiEngine, MidiMessage, Result};
use log::debug;
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Owns one device connection and serializes every write to it.
///
/// The clock thread (pulses) and a worker stream (note events) may share a
/// single port; the mutex gate guarantees a multi-byte message is never torn
/// by an interleaved write. Channels that carry a note-on are recorded so
/// shutdown can sweep exactly the channels actually used.
pub struct OutputSink {
    name: String,
    engine: Mutex<Box<dyn MidiEngine>>,
    used_channels: Mutex<BTreeSet<u8>>,
}

impl OutputSink {
    pub fn new(name: &str, engine: Box<dyn MidiEngine>) -> Self {
        Self {
            name: name.to_string(),
            engine: Mutex::new(engine),
            used_channels: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends one message, in submission order relative to all other callers.
    pub fn send(&self, msg: MidiMessage) -> Result<()> {
        if let MidiMessage::NoteOn { channel, .. } = &msg {
            self.used_channels.lock().unwrap().insert(*channel);
        }
        if !matches!(msg, MidiMessage::Clock) {
            debug!("[{}] sending {:?}", self.name, msg);
        }
        self.engine.lock().unwrap().send(msg)
    }

    /// Channels that carried at least one note-on during this run.
    pub fn used_channels(&self) -> Vec<u8> {
        self.used_channels.lock().unwrap().iter().copied().collect()
    }
}
