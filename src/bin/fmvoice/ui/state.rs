//! Snapshot types sent from the audio thread to the UI
//!
//! Everything here is Copy so the audio callback can publish it without
//! allocating.

use fm_voice::{dsp::EnvelopeState, FmVoice};

/// Voice state captured at the end of an audio callback.
#[derive(Clone, Copy, Debug)]
pub struct VoiceStatus {
    pub is_playing: bool,
    pub envelope_state: EnvelopeState,
    pub envelope_level: f32,
    pub carrier_frequency: f32,
    pub note: Option<u8>,
}

impl VoiceStatus {
    pub fn capture(voice: &FmVoice) -> Self {
        Self {
            is_playing: voice.is_playing(),
            envelope_state: voice.envelope_state(),
            envelope_level: voice.envelope_level(),
            carrier_frequency: voice.carrier_frequency(),
            note: voice.current_note(),
        }
    }
}

impl Default for VoiceStatus {
    fn default() -> Self {
        Self {
            is_playing: false,
            envelope_state: EnvelopeState::Idle,
            envelope_level: 0.0,
            carrier_frequency: 0.0,
            note: None,
        }
    }
}
