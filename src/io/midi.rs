use crate::error::{check_range, Result};

/// Channel-voice events as delivered by a MIDI transport, already decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit bend centred on 0, in -8192..=8191.
    PitchBend { channel: u8, value: i16 },
}

/// A note event for the voice: velocity 0 releases, anything else
/// (re)triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pitch: u8,
    velocity: u8,
}

impl NoteEvent {
    /// Both fields must be 7-bit MIDI values (0-127).
    pub fn new(pitch: u8, velocity: u8) -> Result<Self> {
        check_range("pitch", pitch as f32, 0.0, 127.0)?;
        check_range("velocity", velocity as f32, 0.0, 127.0)?;
        Ok(Self { pitch, velocity })
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn is_note_off(&self) -> bool {
        self.velocity == 0
    }
}
