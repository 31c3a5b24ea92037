#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use std::collections::VecDeque;

use crate::control::ControlId;

/// Requests travelling from the control thread to the render thread.
///
/// Every value carried here has already been validated by the sender.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VoiceMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    AllNotesOff,
    SetControl { id: ControlId, value: f32 },
    SetPan(f32),
    /// Bend offset in semitones.
    PitchBend(f32),
    Play,
    Stop,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<VoiceMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        Consumer::pop(self).ok()
    }
}

/// Single-threaded hosts and tests can queue messages without a ring buffer.
impl MessageReceiver for VecDeque<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        self.pop_front()
    }
}
