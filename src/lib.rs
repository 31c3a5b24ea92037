//! A four-oscillator FM voice.
//!
//! Two modulator pairs (3 → 1, 4 → 2) push the frequency of a sine carrier
//! around the note frequency; an ADSR envelope shapes the carrier's amplitude
//! and an equal-power panner places it in the stereo field.
//!
//! [`FmVoice`] is the single-threaded core. Realtime hosts split it with
//! [`FmVoice::with_handle`] into a render side for the audio callback and a
//! [`synth::handle::VoiceHandle`] for the control thread.

pub mod config;
pub mod control;
pub mod dsp;
pub mod error;
pub mod graph; // Fixed modulation graph
pub mod io;
pub mod synth; // Voice, control messages and the realtime split

pub use config::VoiceConfig;
pub use error::{FmError, Result};
pub use synth::voice::FmVoice;

/// Largest block hosts are expected to request in one callback.
pub const MAX_BLOCK_SIZE: usize = 2048;
