use std::f64::consts::TAU;

/*
Phase-Accumulating Sine
=======================

Every oscillator in an FM voice is a sine whose frequency changes from one
sample to the next. Computing `sin(2π f t)` directly does not work once `f`
moves: a jump in `f` would jump the phase and click. Instead we integrate
the frequency:

    phase[n+1] = phase[n] + f[n] / sample_rate
    sample[n]  = sin(2π · phase[n])

which is exactly the `sin(2π ∫f dτ)` of FM theory. Frequency may jump;
the waveform never does.

Vocabulary
----------

  phase      Position in the cycle, kept in [0, 1). 0.25 is the positive
             peak, 0.75 the negative one.

  increment  f / sample_rate. At 440 Hz and 48 kHz: 0.00917 cycles/sample.

  wrap       After each step we keep only the fractional part. Negative
             frequencies (deep modulation can push the carrier below 0 Hz)
             run the phase backwards; `rem_euclid` keeps it in [0, 1).

Precision
---------

The phase is stored as f64. A voice can run for hours; an f32 phase would
accumulate enough rounding error to audibly detune high notes.
*/

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SinePhase {
    phase: f64,
}

impl SinePhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the sample for the current phase, then advance by `frequency`.
    ///
    /// A non-finite frequency holds the phase instead of poisoning it.
    #[inline]
    pub fn next(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let sample = (TAU * self.phase).sin() as f32;

        if frequency.is_finite() {
            let increment = frequency as f64 / sample_rate as f64;
            self.phase = (self.phase + increment).rem_euclid(1.0);
        }

        sample
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }
}
