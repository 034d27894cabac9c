//! Content generator seams.
//!
//! The sequencer core never chooses notes or rhythms itself; it consumes
//! these two narrow interfaces. The built-in implementations exist so the
//! binary has something to play, and are deliberately simple.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces one beat's worth of content on demand.
pub trait PhraseGenerator: Send {
    /// Returns up to `max_notes` MIDI note numbers in play order.
    /// An empty phrase means the beat should be skipped silently.
    fn generate(&mut self, max_notes: usize) -> Vec<u8>;
}

/// Produces a rhythm motif: positive beat-fractions summing to one beat.
pub trait MotifGenerator: Send {
    fn motif(&mut self) -> Vec<f64>;
}

/// Random walk over a fixed scale.
pub struct ScaleWalk {
    scale: Vec<u8>,
    position: usize,
    /// Chance of producing an empty phrase (a rest) for a beat.
    pub rest_chance: f64,
    rng: StdRng,
}

impl ScaleWalk {
    pub fn new(scale: Vec<u8>) -> Self {
        Self {
            scale,
            position: 0,
            rest_chance: 0.1,
            rng: StdRng::from_entropy(),
        }
    }

    /// A minor pentatonic over two octaves, rooted at A3.
    pub fn a_minor_pentatonic() -> Self {
        Self::new(vec![57, 60, 62, 64, 67, 69, 72, 74, 76, 79])
    }
}

impl PhraseGenerator for ScaleWalk {
    fn generate(&mut self, max_notes: usize) -> Vec<u8> {
        if self.scale.is_empty() || max_notes == 0 || self.rng.gen_bool(self.rest_chance) {
            return Vec::new();
        }
        let count = self.rng.gen_range(1..=max_notes);
        let mut phrase = Vec::with_capacity(count);
        for _ in 0..count {
            // Step -2..=2 scale degrees, clamped to the scale.
            let step = self.rng.gen_range(-2i32..=2);
            let next = self.position as i32 + step;
            self.position = next.clamp(0, self.scale.len() as i32 - 1) as usize;
            phrase.push(self.scale[self.position]);
        }
        phrase
    }
}

/// Draws durations from a menu until they fill exactly one beat.
pub struct WeightedRhythm {
    durations: Vec<f64>,
    rng: StdRng,
}

impl WeightedRhythm {
    pub fn new(durations: Vec<f64>) -> Self {
        Self {
            durations,
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for WeightedRhythm {
    fn default() -> Self {
        Self::new(vec![1.0 / 8.0, 1.0 / 4.0, 1.0 / 2.0, 1.0 / 3.0])
    }
}

impl MotifGenerator for WeightedRhythm {
    fn motif(&mut self) -> Vec<f64> {
        const EPSILON: f64 = 1e-9;
        let mut motif = Vec::new();
        let mut remaining = 1.0_f64;

        while remaining > EPSILON {
            let fits: Vec<f64> = self
                .durations
                .iter()
                .copied()
                .filter(|d| *d > 0.0 && *d <= remaining + EPSILON)
                .collect();
            match fits.as_slice() {
                [] => {
                    // Nothing from the menu fits; close out the beat.
                    motif.push(remaining);
                    break;
                }
                _ => {
                    let pick = fits[self.rng.gen_range(0..fits.len())];
                    motif.push(pick.min(remaining));
                    remaining -= pick;
                }
            }
        }
        motif
    }
}
