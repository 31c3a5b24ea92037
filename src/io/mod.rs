// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

pub use converter::{midi_note_to_freq, midi_to_message, note_to_freq};
pub use midi::{MidiEvent, NoteEvent};
