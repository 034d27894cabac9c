//! Typed configuration for the clock, voices and worker streams.

use std::time::Duration;

/// MIDI standard timing resolution (pulses per quarter note).
pub const TICKS_PER_BEAT: u32 = 24;

/// Timing parameters for the clock source.
#[derive(Debug, Clone, Copy)]
pub struct ClockConfig {
    /// Beats per minute. Must be positive.
    pub bpm: f64,
    /// Clock pulses per beat. Must be positive; 24 is the MIDI standard.
    pub pulses_per_beat: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            pulses_per_beat: TICKS_PER_BEAT,
        }
    }
}

impl ClockConfig {
    pub fn new(bpm: f64, pulses_per_beat: u32) -> Self {
        Self {
            bpm,
            pulses_per_beat,
        }
    }

    /// Time between two clock pulses: 60 / (bpm * pulses_per_beat) seconds.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / (self.bpm * self.pulses_per_beat as f64))
    }
}

/// One independently sequenced output part. Owned exclusively by a single
/// worker stream; never mutated after startup.
#[derive(Debug, Clone)]
pub struct Voice {
    /// MIDI channel (0-15).
    pub channel: u8,
    /// Patch to select at startup, if any.
    pub program: Option<u8>,
    /// Fixed octave offset applied to every note of this voice.
    pub octave_shift: i8,
}

impl Voice {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            program: None,
            octave_shift: 0,
        }
    }
}

/// Per-stream playback parameters.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Seconds of real time per one beat-fraction of hold duration.
    pub factor: f64,
    /// Nominal note-on velocity.
    pub base_velocity: u8,
    /// Uniform jitter applied to the velocity, plus or minus.
    pub velocity_jitter: u8,
    /// Chance per beat of dropping the whole phrase one or two octaves.
    pub octave_drop_chance: f64,
    /// Upper bound on notes requested from the phrase generator per beat.
    pub max_notes_per_beat: usize,
    /// Bounded wait for the next beat signal before re-checking cancellation.
    pub beat_wait: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            factor: 1.0,
            base_velocity: 100,
            velocity_jitter: 10,
            octave_drop_chance: 0.0,
            max_notes_per_beat: 4,
            beat_wait: Duration::from_secs(1),
        }
    }
}
