//! Control surface: what can be tweaked on a voice, and within which bounds.
//!
//! The core never draws sliders. It only describes its parameters so that a
//! UI, a MIDI-learn layer or a test harness can enumerate and drive them.
//!
//! Out-of-range requests are rejected (never clamped) by [`ControlId::validate`].
//! The previous value stays in effect when a request is refused.

use crate::{
    error::{check_duration, check_range, FmError, Result},
    graph::signal::OscSlot,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed interval a control may take.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    pub min: f32,
    pub max: f32,
}

impl ControlRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp into range, mapping NaN to `min`. Used for signal-valued
    /// parameters, which cannot be validated ahead of time.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

pub const INDEX_RANGE: ControlRange = ControlRange::new(0.0, 20.0);
pub const FACTOR_MOD_RANGE: ControlRange = ControlRange::new(0.0, 4.0);
pub const SUSTAIN_RANGE: ControlRange = ControlRange::new(0.0, 1.0);
/// Slider range for envelope times. The lower bound is exclusive; the upper
/// bound only sizes the control, longer times are still accepted.
pub const DURATION_RANGE: ControlRange = ControlRange::new(0.0, 10.0);
pub const PAN_RANGE: ControlRange = ControlRange::new(-1.0, 1.0);
/// Pitch bend offset in semitones.
pub const PITCH_BEND_RANGE: ControlRange = ControlRange::new(-24.0, 24.0);

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Integer,
    Continuous,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeParam {
    Attack,
    Decay,
    Sustain,
    Release,
}

impl EnvelopeParam {
    pub const ALL: [EnvelopeParam; 4] = [
        EnvelopeParam::Attack,
        EnvelopeParam::Decay,
        EnvelopeParam::Sustain,
        EnvelopeParam::Release,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnvelopeParam::Attack => "attack",
            EnvelopeParam::Decay => "decay",
            EnvelopeParam::Sustain => "sustain",
            EnvelopeParam::Release => "release",
        }
    }

    pub fn range(self) -> ControlRange {
        match self {
            EnvelopeParam::Sustain => SUSTAIN_RANGE,
            _ => DURATION_RANGE,
        }
    }

    pub fn validate(self, value: f32) -> Result<f32> {
        match self {
            EnvelopeParam::Sustain => {
                check_range(self.name(), value, SUSTAIN_RANGE.min, SUSTAIN_RANGE.max)
            }
            _ => check_duration(self.name(), value),
        }
    }
}

/// Address of a single control on an [`FmVoice`](crate::FmVoice).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    Index(OscSlot),
    FactorMod(OscSlot),
    Envelope(EnvelopeParam),
}

impl ControlId {
    /// Every control of a voice, in display order.
    pub const ALL: [ControlId; 12] = [
        ControlId::Index(OscSlot::One),
        ControlId::FactorMod(OscSlot::One),
        ControlId::Index(OscSlot::Two),
        ControlId::FactorMod(OscSlot::Two),
        ControlId::Index(OscSlot::Three),
        ControlId::FactorMod(OscSlot::Three),
        ControlId::Index(OscSlot::Four),
        ControlId::FactorMod(OscSlot::Four),
        ControlId::Envelope(EnvelopeParam::Attack),
        ControlId::Envelope(EnvelopeParam::Decay),
        ControlId::Envelope(EnvelopeParam::Sustain),
        ControlId::Envelope(EnvelopeParam::Release),
    ];

    pub fn name(self) -> &'static str {
        match self {
            ControlId::Index(_) => "index",
            ControlId::FactorMod(_) => "factor_mod",
            ControlId::Envelope(param) => param.name(),
        }
    }

    pub fn range(self) -> ControlRange {
        match self {
            ControlId::Index(_) => INDEX_RANGE,
            ControlId::FactorMod(_) => FACTOR_MOD_RANGE,
            ControlId::Envelope(param) => param.range(),
        }
    }

    pub fn resolution(self) -> Resolution {
        match self {
            ControlId::Index(_) => Resolution::Integer,
            _ => Resolution::Continuous,
        }
    }

    /// Title of the group this control belongs to.
    pub fn group_title(self) -> String {
        match self {
            ControlId::Index(slot) | ControlId::FactorMod(slot) => {
                format!("Oscillator {}", slot.identifier())
            }
            ControlId::Envelope(_) => "Envelope".to_string(),
        }
    }

    /// Position of this control in [`ControlId::ALL`].
    pub fn position(self) -> usize {
        match self {
            ControlId::Index(slot) => slot.index() * 2,
            ControlId::FactorMod(slot) => slot.index() * 2 + 1,
            ControlId::Envelope(param) => {
                8 + EnvelopeParam::ALL
                    .iter()
                    .position(|p| *p == param)
                    .unwrap_or_default()
            }
        }
    }

    /// Return `value` if this control accepts it, an error otherwise.
    pub fn validate(self, value: f32) -> Result<f32> {
        match self {
            ControlId::Index(_) => validate_index(value),
            ControlId::FactorMod(_) => validate_factor_mod(value),
            ControlId::Envelope(param) => param.validate(value),
        }
    }

    pub fn describe(self, value: f32) -> ControlDescriptor {
        ControlDescriptor {
            name: self.name(),
            range: self.range(),
            resolution: self.resolution(),
            value,
        }
    }
}

pub(crate) fn validate_index(value: f32) -> Result<f32> {
    let value = check_range("index", value, INDEX_RANGE.min, INDEX_RANGE.max)?;
    if value.fract() != 0.0 {
        return Err(FmError::InvalidArgument {
            what: "index",
            reason: "modulation index must be a whole number",
        });
    }
    Ok(value)
}

pub(crate) fn validate_factor_mod(value: f32) -> Result<f32> {
    check_range(
        "factor_mod",
        value,
        FACTOR_MOD_RANGE.min,
        FACTOR_MOD_RANGE.max,
    )
}

pub(crate) fn validate_pan(value: f32) -> Result<f32> {
    check_range("pan", value, PAN_RANGE.min, PAN_RANGE.max)
}

pub(crate) fn validate_pitch_bend(semitones: f32) -> Result<f32> {
    check_range(
        "pitch_bend",
        semitones,
        PITCH_BEND_RANGE.min,
        PITCH_BEND_RANGE.max,
    )
}

/// `{name, range, resolution, current value}` of one parameter.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlDescriptor {
    pub name: &'static str,
    pub range: ControlRange,
    pub resolution: Resolution,
    pub value: f32,
}

/// A descriptor tagged with the address used to change it.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlEntry {
    pub id: ControlId,
    pub descriptor: ControlDescriptor,
}

impl ControlEntry {
    pub fn new(id: ControlId, value: f32) -> Self {
        Self {
            id,
            descriptor: id.describe(value),
        }
    }
}

/// Controls of one oscillator or of the envelope, under a display title.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ControlGroup {
    pub title: String,
    pub controls: Vec<ControlEntry>,
}

/// Group a flat control list by [`ControlId::group_title`], keeping order.
pub fn group_controls(entries: &[ControlEntry]) -> Vec<ControlGroup> {
    let mut groups: Vec<ControlGroup> = Vec::new();
    for entry in entries {
        let title = entry.id.group_title();
        match groups.last_mut() {
            Some(group) if group.title == title => group.controls.push(*entry),
            _ => groups.push(ControlGroup {
                title,
                controls: vec![*entry],
            }),
        }
    }
    groups
}
