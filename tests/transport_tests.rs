use beatsyncrs::config::{ClockConfig, StreamConfig, Voice};
use beatsyncrs::generator::{MotifGenerator, PhraseGenerator};
use beatsyncrs::midi::{MidiMessage, MockMidiEngine, ALL_NOTES_OFF};
use beatsyncrs::transport::{TransportController, VoiceSpec};
use std::time::{Duration, Instant};

struct OneNote(u8);

impl PhraseGenerator for OneNote {
    fn generate(&mut self, _max_notes: usize) -> Vec<u8> {
        vec![self.0]
    }
}

struct WholeBeat {
    duration: f64,
}

impl MotifGenerator for WholeBeat {
    fn motif(&mut self) -> Vec<f64> {
        vec![self.duration]
    }
}

fn voice_spec(channel: u8, sink: usize, note: u8, factor: f64) -> VoiceSpec {
    VoiceSpec {
        voice: Voice::new(channel),
        sink,
        config: StreamConfig {
            factor,
            velocity_jitter: 0,
            beat_wait: Duration::from_millis(100),
            ..StreamConfig::default()
        },
        phrases: Box::new(OneNote(note)),
        rhythm: Box::new(WholeBeat { duration: 1.0 }),
    }
}

fn wait_until<F: Fn() -> bool>(pred: F, timeout: Duration, what: &str) {
    let deadline = Instant::now() + timeout;
    while !pred() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn count_sweeps(messages: &[MidiMessage], channel: u8) -> usize {
    messages
        .iter()
        .filter(|m| {
            matches!(
                m,
                MidiMessage::ControlChange {
                    channel: c,
                    controller: ALL_NOTES_OFF,
                    ..
                } if *c == channel
            )
        })
        .count()
}

#[test]
fn shutdown_sweeps_each_used_channel_exactly_once() {
    // Fast clock: beat every 4 ticks of ~12.5 ms.
    let mut transport = TransportController::new(ClockConfig::new(1200.0, 4));
    let engine = MockMidiEngine::default();
    let sink = transport.add_sink("mock", Box::new(engine.clone()));
    let stopper = transport.stop_handle();

    transport
        .start(vec![
            voice_spec(0, sink, 60, 0.01),
            voice_spec(1, sink, 36, 0.01),
        ])
        .unwrap();

    let has_note_on = |channel: u8| {
        engine
            .messages()
            .iter()
            .any(|m| matches!(m, MidiMessage::NoteOn { channel: c, .. } if *c == channel))
    };
    wait_until(
        || has_note_on(0) && has_note_on(1),
        Duration::from_secs(5),
        "a note-on from both voices",
    );

    stopper.request_stop();
    transport.run(None);

    let messages = engine.messages();
    assert_eq!(
        messages
            .iter()
            .filter(|m| **m == MidiMessage::Stop)
            .count(),
        1
    );
    assert_eq!(count_sweeps(&messages, 0), 1);
    assert_eq!(count_sweeps(&messages, 1), 1);
    // Only the channels that actually sounded get swept.
    assert_eq!(
        messages
            .iter()
            .filter(|m| matches!(
                m,
                MidiMessage::ControlChange {
                    controller: ALL_NOTES_OFF,
                    ..
                }
            ))
            .count(),
        2
    );

    // Idempotence: a second shutdown sends nothing further.
    let before = engine.messages().len();
    transport.shutdown();
    assert_eq!(engine.messages().len(), before);
}

#[test]
fn transport_start_precedes_all_other_messages() {
    let mut transport = TransportController::new(ClockConfig::new(1200.0, 4));
    let engine = MockMidiEngine::default();
    let sink = transport.add_sink("mock", Box::new(engine.clone()));

    transport.start(vec![voice_spec(0, sink, 60, 0.01)]).unwrap();
    wait_until(
        || !engine.messages().is_empty(),
        Duration::from_secs(5),
        "any message",
    );
    assert_eq!(engine.messages()[0], MidiMessage::Start);

    transport.shutdown();
}

#[test]
fn run_stops_after_the_beat_bound() {
    let mut transport = TransportController::new(ClockConfig::new(1200.0, 4));
    let engine = MockMidiEngine::default();
    let sink = transport.add_sink("mock", Box::new(engine.clone()));

    transport.start(vec![voice_spec(0, sink, 60, 0.01)]).unwrap();
    let started = Instant::now();
    transport.run(Some(2));

    // Two beats at 1200 BPM is 100 ms; the run must end promptly, not hang.
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(transport.ticks().value() >= 8, "two beats is eight ticks");
    assert!(engine.messages().contains(&MidiMessage::Stop));
}

#[test]
fn interrupt_during_a_long_hold_finishes_the_note_then_silences() {
    let mut transport = TransportController::new(ClockConfig::new(1200.0, 4));
    let engine = MockMidiEngine::default();
    let sink = transport.add_sink("mock", Box::new(engine.clone()));
    let stopper = transport.stop_handle();

    // One note per beat held for 1.5 s of real time.
    transport.start(vec![voice_spec(0, sink, 60, 1.5)]).unwrap();
    wait_until(
        || {
            engine
                .messages()
                .iter()
                .any(|m| matches!(m, MidiMessage::NoteOn { .. }))
        },
        Duration::from_secs(5),
        "the first note-on",
    );

    let stop_requested = Instant::now();
    stopper.request_stop();
    transport.run(None);

    // Bounded by the in-flight hold plus join overhead, nowhere near the
    // abandon timeout.
    assert!(stop_requested.elapsed() < Duration::from_secs(4));

    // The channel's message sequence ends note-off then all-notes-off.
    let channel_messages: Vec<MidiMessage> = engine
        .messages()
        .iter()
        .filter(|m| {
            matches!(
                m,
                MidiMessage::NoteOn { channel: 0, .. }
                    | MidiMessage::NoteOff { channel: 0, .. }
                    | MidiMessage::ControlChange { channel: 0, .. }
            )
        })
        .cloned()
        .collect();
    let len = channel_messages.len();
    assert!(len >= 2);
    assert!(matches!(
        channel_messages[len - 1],
        MidiMessage::ControlChange {
            controller: ALL_NOTES_OFF,
            ..
        }
    ));
    assert!(matches!(
        channel_messages[len - 2],
        MidiMessage::NoteOff { .. }
    ));
}

#[test]
fn startup_failure_aborts_before_any_thread_is_spawned() {
    let mut transport = TransportController::new(ClockConfig::default());
    let engine = MockMidiEngine::default();
    engine.set_failing(true);
    let sink = transport.add_sink("mock", Box::new(engine.clone()));

    let result = transport.start(vec![voice_spec(0, sink, 60, 0.01)]);
    assert!(result.is_err());
    assert!(engine.messages().is_empty());
}
