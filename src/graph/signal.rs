#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Signals and Parameters
======================

Every parameter of a modulation oscillator is either a plain number or a
reference to another signal in the voice:

    index      = 4                      (constant)
    modulation = output of oscillator 3 (signal)

Both shapes are represented by `ParamValue` and read through a single
`evaluate()` call, so the oscillator math never needs to know which one it
got.

The Signal Bus
--------------

The voice graph is evaluated once per sample in a fixed order:

    note frequency → osc3, osc4 → osc1, osc2 → envelope → carrier

Each node writes its output into the `SignalBus` as soon as it is computed.
Downstream nodes then read upstream values for the *same* tick from the bus.
The bus is a plain `Copy` struct with one slot per node, so reading and
writing it never allocates.
*/

/// One of the four oscillator positions in the FM topology.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OscSlot {
    One,
    Two,
    Three,
    Four,
}

impl OscSlot {
    pub const ALL: [OscSlot; 4] = [OscSlot::One, OscSlot::Two, OscSlot::Three, OscSlot::Four];

    pub fn index(self) -> usize {
        match self {
            OscSlot::One => 0,
            OscSlot::Two => 1,
            OscSlot::Three => 2,
            OscSlot::Four => 3,
        }
    }

    /// Label shown on control surfaces. Modulators name their target in
    /// parentheses: oscillator 3 drives oscillator 1, so it reads "3 (1)".
    pub fn identifier(self) -> &'static str {
        match self {
            OscSlot::One => "1",
            OscSlot::Two => "2",
            OscSlot::Three => "3 (1)",
            OscSlot::Four => "4 (2)",
        }
    }

    /// The oscillator feeding this slot's frequency input, if any.
    pub fn modulator(self) -> Option<OscSlot> {
        match self {
            OscSlot::One => Some(OscSlot::Three),
            OscSlot::Two => Some(OscSlot::Four),
            OscSlot::Three | OscSlot::Four => None,
        }
    }
}

/// A named output inside the voice graph.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalRef {
    /// Frequency of the current note in Hz (output of the note converter).
    NoteFrequency,
    /// Output of one of the four modulation oscillators (Hz of deviation).
    Oscillator(OscSlot),
    /// Current envelope level (0.0 - 1.0).
    Envelope,
}

impl SignalRef {
    /// Only the note converter output is an absolute frequency.
    pub fn is_frequency(self) -> bool {
        matches!(self, SignalRef::NoteFrequency)
    }
}

/// A parameter that is either fixed or follows another signal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Constant(f32),
    Signal(SignalRef),
}

impl ParamValue {
    #[inline]
    pub fn evaluate(&self, bus: &SignalBus) -> f32 {
        match *self {
            ParamValue::Constant(value) => value,
            ParamValue::Signal(signal) => bus.read(signal),
        }
    }

    pub fn constant(&self) -> Option<f32> {
        match *self {
            ParamValue::Constant(value) => Some(value),
            ParamValue::Signal(_) => None,
        }
    }
}

impl Default for ParamValue {
    fn default() -> Self {
        ParamValue::Constant(0.0)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Constant(value)
    }
}

impl From<u8> for ParamValue {
    fn from(value: u8) -> Self {
        ParamValue::Constant(value as f32)
    }
}

impl From<SignalRef> for ParamValue {
    fn from(signal: SignalRef) -> Self {
        ParamValue::Signal(signal)
    }
}

/// Per-tick values of every node in the voice graph.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalBus {
    pub note_frequency: f32,
    pub oscillators: [f32; 4],
    pub envelope: f32,
}

impl SignalBus {
    pub fn with_note_frequency(note_frequency: f32) -> Self {
        Self {
            note_frequency,
            ..Self::default()
        }
    }

    #[inline]
    pub fn read(&self, signal: SignalRef) -> f32 {
        match signal {
            SignalRef::NoteFrequency => self.note_frequency,
            SignalRef::Oscillator(slot) => self.oscillators[slot.index()],
            SignalRef::Envelope => self.envelope,
        }
    }

    #[inline]
    pub fn oscillator(&self, slot: OscSlot) -> f32 {
        self.oscillators[slot.index()]
    }

    #[inline]
    pub fn set_oscillator(&mut self, slot: OscSlot, value: f32) {
        self.oscillators[slot.index()] = value;
    }
}
