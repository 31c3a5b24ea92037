use std::f32::consts::FRAC_PI_4;

use crate::{control::validate_pan, error::Result};

/*
Equal-Power Panning
===================

A mono signal is split into left and right with gains that follow a
quarter circle:

    angle = (position + 1) · π/4        position ∈ [-1, 1]
    left  = cos(angle)
    right = sin(angle)

Because cos² + sin² = 1, the total acoustic power stays constant as the
signal moves across the field. A linear split (left = 1 - p, right = p)
would dip by 3 dB in the middle.

    position  -1.0   0.0     1.0
    left       1.0   0.707   0.0
    right      0.0   0.707   1.0
*/

/// One stereo sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub const SILENCE: StereoFrame = StereoFrame {
        left: 0.0,
        right: 0.0,
    };

    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.right.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panner {
    position: f32,
    left_gain: f32,
    right_gain: f32,
}

impl Panner {
    pub fn centered() -> Self {
        Self::from_position(0.0)
    }

    pub fn new(position: f32) -> Result<Self> {
        Ok(Self::from_position(validate_pan(position)?))
    }

    fn from_position(position: f32) -> Self {
        let angle = (position + 1.0) * FRAC_PI_4;
        Self {
            position,
            left_gain: angle.cos(),
            right_gain: angle.sin(),
        }
    }

    pub fn set_position(&mut self, position: f32) -> Result<()> {
        *self = Self::new(position)?;
        Ok(())
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    #[inline]
    pub fn process(&self, sample: f32) -> StereoFrame {
        StereoFrame {
            left: sample * self.left_gain,
            right: sample * self.right_gain,
        }
    }
}

impl Default for Panner {
    fn default() -> Self {
        Self::centered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_splits_equally() {
        let frame = Panner::centered().process(1.0);
        assert!((frame.left - frame.right).abs() < 1e-6);
        assert!((frame.left - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn power_is_constant_across_positions() {
        for i in 0..=20 {
            let position = -1.0 + i as f32 * 0.1;
            let frame = Panner::new(position).unwrap().process(1.0);
            let power = frame.left * frame.left + frame.right * frame.right;
            assert!((power - 1.0).abs() < 1e-5, "power {power} at {position}");
        }
    }

    #[test]
    fn hard_left_and_right() {
        let left = Panner::new(-1.0).unwrap().process(1.0);
        assert!((left.left - 1.0).abs() < 1e-6 && left.right.abs() < 1e-6);

        let right = Panner::new(1.0).unwrap().process(1.0);
        assert!(right.left.abs() < 1e-6 && (right.right - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejected_position_keeps_previous() {
        let mut panner = Panner::new(0.5).unwrap();
        assert!(panner.set_position(2.0).is_err());
        assert_eq!(panner.position(), 0.5);
    }
}
