use crate::{
    config::validate_index_scale,
    control::{
        validate_factor_mod, validate_index, ControlEntry, ControlId, FACTOR_MOD_RANGE,
        INDEX_RANGE,
    },
    dsp::oscillator::SinePhase,
    error::{FmError, Result},
    graph::{
        node::{AudioSignal, RenderCtx},
        signal::{OscSlot, ParamValue, SignalBus, SignalRef},
    },
};

/*
Modulation Oscillator
=====================

The building block of the FM voice. It is a sine wave whose output is not
heard directly: it is added to another oscillator's frequency.

    frequency(t) = base(t) × factor_mod + modulation(t)
    output(t)    = sin(2π ∫ frequency dτ) × index × index_scale

Parameters
----------

  base          The note frequency in Hz. Must be a frequency signal; a bare
                number would detach the oscillator from the keyboard.

  factor_mod    Ratio between this oscillator's frequency and the note.
                1.0 = unison, 2.0 = an octave up, 0.5 = an octave down.
                Non-integer ratios give inharmonic, bell-like spectra.

  modulation    Another oscillator's output added to the frequency
                (cascaded FM), or 0.

  index         Modulation depth, a whole number from 0 to 20. The output
                peaks at ±index × index_scale Hz, so with the default scale
                of 50, index 4 swings the target ±200 Hz.

Example usage:
  let osc = ModulatorOscillator::new(
      OscillatorParams::new(SignalRef::NoteFrequency)
          .identifier("1")
          .index(4u8)
          .factor_mod(2.0),
      DEFAULT_INDEX_SCALE,
  )?;

Parameter Updates
-----------------

`set_index` and `set_factor_mod` only change what future samples are made
of; the running phase is never touched, so the output stays continuous.
Signal-valued parameters cannot be checked ahead of time: they are clamped
into their range every sample (NaN reads as the lower bound).
*/

/// Construction arguments for a [`ModulatorOscillator`].
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorParams {
    pub base_frequency: SignalRef,
    pub modulation_input: ParamValue,
    pub identifier: String,
    pub index: ParamValue,
    pub factor_mod: ParamValue,
}

impl OscillatorParams {
    /// Defaults: no modulation input, empty identifier, index 0, factor 1.
    pub fn new(base_frequency: SignalRef) -> Self {
        Self {
            base_frequency,
            modulation_input: ParamValue::Constant(0.0),
            identifier: String::new(),
            index: ParamValue::Constant(0.0),
            factor_mod: ParamValue::Constant(1.0),
        }
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn modulation(mut self, input: impl Into<ParamValue>) -> Self {
        self.modulation_input = input.into();
        self
    }

    pub fn index(mut self, index: impl Into<ParamValue>) -> Self {
        self.index = index.into();
        self
    }

    pub fn factor_mod(mut self, factor_mod: impl Into<ParamValue>) -> Self {
        self.factor_mod = factor_mod.into();
        self
    }
}

pub struct ModulatorOscillator {
    identifier: String,
    base_frequency: SignalRef,
    modulation_input: ParamValue,
    index: ParamValue,
    factor_mod: ParamValue,
    index_scale: f32,
    active: bool,
    phase: SinePhase,
    /// Last evaluated values, reported for signal-valued parameters.
    current_index: f32,
    current_factor_mod: f32,
    current_frequency: f32,
}

impl ModulatorOscillator {
    /// Validate every argument before building anything.
    pub fn new(params: OscillatorParams, index_scale: f32) -> Result<Self> {
        if !params.base_frequency.is_frequency() {
            return Err(FmError::InvalidArgument {
                what: "base_frequency",
                reason: "must be a frequency-producing signal (the note frequency)",
            });
        }
        if let ParamValue::Constant(value) = params.modulation_input {
            if !value.is_finite() {
                return Err(FmError::InvalidArgument {
                    what: "modulation_input",
                    reason: "constant modulation must be a finite number",
                });
            }
        }
        let current_index = check_param(params.index, validate_index)?;
        let current_factor_mod = check_param(params.factor_mod, validate_factor_mod)?;
        let index_scale = validate_index_scale(index_scale)?;

        Ok(Self {
            identifier: params.identifier,
            base_frequency: params.base_frequency,
            modulation_input: params.modulation_input,
            index: params.index,
            factor_mod: params.factor_mod,
            index_scale,
            active: false,
            phase: SinePhase::new(),
            current_index,
            current_factor_mod,
            current_frequency: 0.0,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn index(&self) -> ParamValue {
        self.index
    }

    pub fn factor_mod(&self) -> ParamValue {
        self.factor_mod
    }

    pub fn modulation_input(&self) -> ParamValue {
        self.modulation_input
    }

    /// Frequency used for the most recent sample, in Hz.
    pub fn current_frequency(&self) -> f32 {
        self.current_frequency
    }

    pub fn set_index(&mut self, index: impl Into<ParamValue>) -> Result<()> {
        let index = index.into();
        self.current_index = check_param(index, validate_index)?;
        self.index = index;
        Ok(())
    }

    pub fn set_factor_mod(&mut self, factor_mod: impl Into<ParamValue>) -> Result<()> {
        let factor_mod = factor_mod.into();
        self.current_factor_mod = check_param(factor_mod, validate_factor_mod)?;
        self.factor_mod = factor_mod;
        Ok(())
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `index` and `factor_mod` entries, tagged with this oscillator's slot.
    pub fn describe_controls(&self, slot: OscSlot) -> [ControlEntry; 2] {
        [
            ControlEntry::new(ControlId::Index(slot), self.current_index),
            ControlEntry::new(ControlId::FactorMod(slot), self.current_factor_mod),
        ]
    }
}

impl AudioSignal for ModulatorOscillator {
    type Frame = f32;

    fn play(&mut self) {
        self.activate();
    }

    fn stop(&mut self) {
        self.deactivate();
    }

    fn is_playing(&self) -> bool {
        self.active
    }

    #[inline]
    fn next_frame(&mut self, inputs: &SignalBus, ctx: &RenderCtx) -> f32 {
        if !self.active {
            return 0.0;
        }

        let index = INDEX_RANGE.clamp(self.index.evaluate(inputs));
        let factor_mod = FACTOR_MOD_RANGE.clamp(self.factor_mod.evaluate(inputs));
        let modulation = finite_or_zero(self.modulation_input.evaluate(inputs));
        let base = finite_or_zero(inputs.read(self.base_frequency));

        let frequency = base * factor_mod + modulation;
        self.current_index = index;
        self.current_factor_mod = factor_mod;
        self.current_frequency = frequency;

        self.phase.next(frequency, ctx.sample_rate()) * index * self.index_scale
    }
}

/// Validate a constant; signals are accepted and reported at the range minimum
/// until first evaluated.
fn check_param(value: ParamValue, validate: fn(f32) -> Result<f32>) -> Result<f32> {
    match value {
        ParamValue::Constant(constant) => validate(constant),
        ParamValue::Signal(_) => Ok(0.0),
    }
}

#[inline]
fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
