//! Low-level DSP primitives used by the graph nodes.
//!
//! These components are allocation-free and realtime-safe, so they can sit
//! directly inside the voice.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Phase-accumulating sine.
pub mod oscillator;
/// Equal-power stereo panning.
pub mod pan;

pub use envelope::EnvelopeState;
pub use pan::StereoFrame;
