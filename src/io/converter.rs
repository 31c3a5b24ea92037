use crate::{
    error::{FmError, Result},
    io::midi::MidiEvent,
    synth::message::VoiceMessage,
};

/// Convert a decoded MIDI event into a voice message.
///
/// Only events on `channel_filter` are kept. A note-on with velocity 0 is a
/// note-off, as the MIDI running-status convention requires. Pitch bend is
/// scaled so full deflection is [`PITCH_BEND_SEMITONES`].
pub fn midi_to_message(midi: MidiEvent, channel_filter: u8) -> Option<VoiceMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(if velocity == 0 {
            VoiceMessage::NoteOff { note: key }
        } else {
            VoiceMessage::NoteOn {
                note: key,
                velocity,
            }
        }),
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(VoiceMessage::NoteOff { note: key })
        }
        MidiEvent::ControlChange {
            channel,
            controller: ALL_NOTES_OFF_CC,
            ..
        } if channel == channel_filter => Some(VoiceMessage::AllNotesOff),
        MidiEvent::PitchBend { channel, value } if channel == channel_filter => Some(
            VoiceMessage::PitchBend(value as f32 / PITCH_BEND_CENTRE * PITCH_BEND_SEMITONES),
        ),
        _ => None,
    }
}

const ALL_NOTES_OFF_CC: u8 = 123;
const PITCH_BEND_CENTRE: f32 = 8192.0;

/// Bend range of a MIDI pitch wheel at full deflection.
pub const PITCH_BEND_SEMITONES: f32 = 2.0;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Continuous form of [`midi_note_to_freq`], for pitch signals that carry
/// bends or glides. Fractional notes are cents away from the semitone grid.
pub fn note_to_freq(note: f32) -> Result<f32> {
    if !note.is_finite() {
        return Err(FmError::InvalidArgument {
            what: "note",
            reason: "MIDI note number must be finite",
        });
    }

    let freq = 440.0 * 2.0_f32.powf((note - 69.0) / 12.0);
    if freq.is_finite() {
        Ok(freq)
    } else {
        Err(FmError::InvalidArgument {
            what: "note",
            reason: "MIDI note number is too high to express as a frequency",
        })
    }
}
