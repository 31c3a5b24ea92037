#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    control::{validate_factor_mod, validate_index, validate_pan, EnvelopeParam},
    error::{FmError, Result},
    graph::signal::OscSlot,
};

/// Maps the 0-20 modulation index control onto Hz of frequency deviation.
///
/// Tuned by ear: at the top of the range (20 × 50 = 1000 Hz deviation) the
/// sidebands are dense but do not fold back into harsh aliasing at 44.1 kHz.
pub const DEFAULT_INDEX_SCALE: f32 = 50.0;

/// ADSR timings in seconds, sustain as a level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeConfig {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    pub fn get(&self, param: EnvelopeParam) -> f32 {
        match param {
            EnvelopeParam::Attack => self.attack,
            EnvelopeParam::Decay => self.decay,
            EnvelopeParam::Sustain => self.sustain,
            EnvelopeParam::Release => self.release,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for param in EnvelopeParam::ALL {
            param.validate(self.get(param))?;
        }
        Ok(())
    }
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.05,
            decay: 0.4,
            sustain: 0.3,
            release: 0.5,
        }
    }
}

/// Initial settings of one modulation oscillator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorConfig {
    pub index: u8,
    pub factor_mod: f32,
}

impl OscillatorConfig {
    pub fn new(index: u8, factor_mod: f32) -> Self {
        Self { index, factor_mod }
    }

    pub fn validate(&self) -> Result<()> {
        validate_index(self.index as f32)?;
        validate_factor_mod(self.factor_mod)?;
        Ok(())
    }
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            index: 0,
            factor_mod: 1.0,
        }
    }
}

/// Everything needed to build an [`FmVoice`](crate::FmVoice).
///
/// The default reproduces the classic patch: all modulation indices at zero
/// (a plain sine), 50 ms attack, 400 ms decay to 30 %, 500 ms release,
/// centred in the stereo field.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    pub envelope: EnvelopeConfig,
    /// Indexed by [`OscSlot::index`].
    pub oscillators: [OscillatorConfig; 4],
    /// -1.0 (left) to 1.0 (right).
    pub pan: f32,
    pub index_scale: f32,
}

impl VoiceConfig {
    pub fn with_envelope(mut self, envelope: EnvelopeConfig) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_oscillator(mut self, slot: OscSlot, oscillator: OscillatorConfig) -> Self {
        self.oscillators[slot.index()] = oscillator;
        self
    }

    pub fn with_pan(mut self, pan: f32) -> Self {
        self.pan = pan;
        self
    }

    pub fn with_index_scale(mut self, index_scale: f32) -> Self {
        self.index_scale = index_scale;
        self
    }

    pub fn oscillator(&self, slot: OscSlot) -> &OscillatorConfig {
        &self.oscillators[slot.index()]
    }

    pub fn validate(&self) -> Result<()> {
        self.envelope.validate()?;
        for oscillator in &self.oscillators {
            oscillator.validate()?;
        }
        validate_pan(self.pan)?;
        validate_index_scale(self.index_scale)?;
        Ok(())
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            envelope: EnvelopeConfig::default(),
            oscillators: [OscillatorConfig::default(); 4],
            pan: 0.0,
            index_scale: DEFAULT_INDEX_SCALE,
        }
    }
}

pub(crate) fn validate_index_scale(index_scale: f32) -> Result<f32> {
    if index_scale.is_finite() && index_scale > 0.0 {
        Ok(index_scale)
    } else {
        Err(FmError::InvalidArgument {
            what: "index_scale",
            reason: "must be a finite, positive number of Hz per index step",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(VoiceConfig::default().validate().is_ok());
        assert_eq!(VoiceConfig::default().index_scale, 50.0);
    }

    #[test]
    fn rejects_bad_envelope() {
        let config = VoiceConfig::default().with_envelope(EnvelopeConfig::new(0.0, 0.1, 0.5, 0.1));
        assert!(config.validate().is_err());

        let config = VoiceConfig::default().with_envelope(EnvelopeConfig::new(0.1, 0.1, 1.2, 0.1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_oscillator_and_pan() {
        let config = VoiceConfig::default().with_oscillator(OscSlot::Two, OscillatorConfig::new(21, 1.0));
        assert!(config.validate().is_err());

        let config = VoiceConfig::default().with_oscillator(OscSlot::Two, OscillatorConfig::new(3, 4.5));
        assert!(config.validate().is_err());

        assert!(VoiceConfig::default().with_pan(1.5).validate().is_err());
        assert!(VoiceConfig::default().with_index_scale(0.0).validate().is_err());
    }
}
