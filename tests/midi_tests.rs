use beatsyncrs::midi::{MidiMessage, ALL_NOTES_OFF};

#[test]
fn system_realtime_messages_encode_to_single_bytes() {
    assert_eq!(MidiMessage::Clock.to_bytes(), vec![0xF8]);
    assert_eq!(MidiMessage::Start.to_bytes(), vec![0xFA]);
    assert_eq!(MidiMessage::Stop.to_bytes(), vec![0xFC]);
}

#[test]
fn channel_messages_encode_status_plus_channel() {
    assert_eq!(
        MidiMessage::NoteOn {
            channel: 2,
            note: 60,
            velocity: 100
        }
        .to_bytes(),
        vec![0x92, 60, 100]
    );
    assert_eq!(
        MidiMessage::NoteOff {
            channel: 2,
            note: 60,
            velocity: 0
        }
        .to_bytes(),
        vec![0x82, 60, 0]
    );
    assert_eq!(
        MidiMessage::ProgramChange {
            channel: 1,
            program: 44
        }
        .to_bytes(),
        vec![0xC1, 44]
    );
}

#[test]
fn all_notes_off_is_controller_123() {
    assert_eq!(
        MidiMessage::ControlChange {
            channel: 3,
            controller: ALL_NOTES_OFF,
            value: 0
        }
        .to_bytes(),
        vec![0xB3, 123, 0]
    );
}

#[test]
fn channel_nibble_is_masked() {
    // Out-of-range channels must not corrupt the status nibble.
    assert_eq!(
        MidiMessage::NoteOn {
            channel: 0x1F,
            note: 60,
            velocity: 100
        }
        .to_bytes()[0],
        0x9F
    );
}
