//! Worker stream: plays one voice, quantized to beat boundaries.

use crate::beat::BeatSignal;
use crate::config::{StreamConfig, Voice};
use crate::generator::{MotifGenerator, PhraseGenerator};
use crate::midi::{self, MidiMessage};
use crate::sink::OutputSink;
use crate::state::RunState;
use crate::transport::Fault;
use crossbeam::channel::Sender;
use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Plays one [`Voice`] on its own thread.
///
/// On every consumed beat signal it asks the phrase generator for one beat
/// of notes and the motif generator for the beat's rhythm, pairs them
/// index-wise (looping the shorter), and plays the events strictly one at a
/// time: note-on, blocking hold, note-off.
pub struct WorkerStream {
    voice: Voice,
    config: StreamConfig,
    sink: Arc<OutputSink>,
    beat: Arc<BeatSignal>,
    phrases: Box<dyn PhraseGenerator>,
    rhythm: Box<dyn MotifGenerator>,
    run_state: RunState,
    faults: Sender<Fault>,
}

impl WorkerStream {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        voice: Voice,
        config: StreamConfig,
        sink: Arc<OutputSink>,
        beat: Arc<BeatSignal>,
        phrases: Box<dyn PhraseGenerator>,
        rhythm: Box<dyn MotifGenerator>,
        run_state: RunState,
        faults: Sender<Fault>,
    ) -> Self {
        Self {
            voice,
            config,
            sink,
            beat,
            phrases,
            rhythm,
            run_state,
            faults,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn run(mut self) {
        let mut rng = StdRng::from_entropy();
        info!(
            "Worker started for channel {} on sink '{}'",
            self.voice.channel,
            self.sink.name()
        );

        if let Some(program) = self.voice.program {
            if let Err(e) = self.sink.send(MidiMessage::ProgramChange {
                channel: self.voice.channel,
                program,
            }) {
                error!("Program change failed on channel {}: {}", self.voice.channel, e);
                let _ = self.faults.send(Fault::Voice {
                    channel: self.voice.channel,
                    error: e,
                });
                return;
            }
        }

        while !self.run_state.is_stopping() {
            // A timed-out wait is normal control flow: loop back and
            // re-check cancellation.
            if !self.beat.wait_and_consume(self.config.beat_wait) {
                continue;
            }
            if let Err(e) = self.play_beat(&mut rng) {
                error!("Voice on channel {} stopping: {}", self.voice.channel, e);
                let _ = self.faults.send(Fault::Voice {
                    channel: self.voice.channel,
                    error: e,
                });
                return;
            }
        }

        info!("Worker for channel {} stopped", self.voice.channel);
    }

    fn play_beat(&mut self, rng: &mut StdRng) -> midi::Result<()> {
        let phrase = self.phrases.generate(self.config.max_notes_per_beat);
        if phrase.is_empty() {
            debug!("Empty phrase on channel {}, skipping beat", self.voice.channel);
            return Ok(());
        }
        let motif = self.rhythm.motif();
        if motif.is_empty() {
            debug!("Empty motif on channel {}, skipping beat", self.voice.channel);
            return Ok(());
        }

        let mut shift = self.voice.octave_shift as i32 * 12;
        if self.config.octave_drop_chance > 0.0 && rng.gen_bool(self.config.octave_drop_chance) {
            // Drop the whole beat one or two octaves.
            shift -= 12 * rng.gen_range(1..=2);
        }

        // Pair notes and durations index-wise, looping the shorter sequence.
        let events = phrase.len().max(motif.len());
        for i in 0..events {
            let note = transpose(phrase[i % phrase.len()], shift);
            let duration = motif[i % motif.len()];
            let velocity = self.pick_velocity(rng);
            let channel = self.voice.channel;

            self.sink.send(MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            })?;
            thread::sleep(Duration::from_secs_f64(duration * self.config.factor));
            self.sink.send(MidiMessage::NoteOff {
                channel,
                note,
                velocity: 0,
            })?;

            // Finish the in-flight note, then yield to shutdown. Bounds
            // shutdown latency to one hold duration.
            if self.run_state.is_stopping() {
                break;
            }
        }
        Ok(())
    }

    fn pick_velocity(&self, rng: &mut StdRng) -> u8 {
        let jitter = self.config.velocity_jitter as i32;
        if jitter == 0 {
            return self.config.base_velocity.min(127);
        }
        let velocity = self.config.base_velocity as i32 + rng.gen_range(-jitter..=jitter);
        velocity.clamp(1, 127) as u8
    }
}

/// Shifts a note by `semitones`, clamped to the valid MIDI range.
fn transpose(note: u8, semitones: i32) -> u8 {
    (note as i32 + semitones).clamp(0, 127) as u8
}
