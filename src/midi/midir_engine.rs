use crate::midi::{MidiEngine, MidiError, MidiMessage, Result};
use log::info;
use midir::{MidiOutput, MidiOutputConnection};

/// Output-only MIDI engine backed by a midir port connection.
pub struct MidirEngine {
    output: MidiOutputConnection,
}

impl MidirEngine {
    /// Connects to the first output port whose name contains `port_name`.
    pub fn new(port_name: &str) -> Result<Self> {
        let midi_out = MidiOutput::new("beatsyncrs-out")
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        let out_ports = midi_out.ports();
        let out_port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(port_name)
            })
            .ok_or_else(|| {
                MidiError::ConnectionError(format!("Output port '{}' not found", port_name))
            })?;

        let full_name = midi_out.port_name(out_port).unwrap_or_default();
        info!("Connecting to MIDI output port: {}", full_name);

        let output = midi_out
            .connect(out_port, "beatsyncrs-output")
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        Ok(MidirEngine { output })
    }

    /// Lists the names of all available MIDI output ports.
    pub fn list_ports() -> Vec<String> {
        let mut ports = Vec::new();

        if let Ok(midi_out) = MidiOutput::new("beatsyncrs-list") {
            for port in midi_out.ports() {
                if let Ok(name) = midi_out.port_name(&port) {
                    ports.push(name);
                }
            }
        }

        ports
    }
}

impl MidiEngine for MidirEngine {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        let bytes = msg.to_bytes();
        self.output
            .send(&bytes)
            .map_err(|e| MidiError::SendError(e.to_string()))
    }
}
