//! MIDI functionality for beatsyncrs
//!
//! This module provides MIDI communication capabilities, including:
//! - Core MIDI message types and error handling
//! - Real MIDI device output via midir
//! - Mock implementations for testing
//!
//! The main components are:
//! - [`MidiEngine`] trait for sending MIDI messages
//! - [`MidirEngine`] for real MIDI device communication
//! - [`MockMidiEngine`] for testing

mod engine;
pub mod midir_engine;
pub mod mock_engine;

// Re-export main types from engine
pub use engine::{MidiEngine, MidiError, MidiMessage, Result, ALL_NOTES_OFF};

// Re-export concrete implementations
pub use midir_engine::MidirEngine;
pub use mock_engine::{MockMidiEngine, SentMessage};

// Set default engine type
#[cfg(not(feature = "test-mock"))]
pub type DefaultMidiEngine = MidirEngine;
#[cfg(feature = "test-mock")]
pub type DefaultMidiEngine = MockMidiEngine;
