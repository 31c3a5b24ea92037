use crate::{
    config::EnvelopeConfig,
    control::{ControlEntry, ControlId, EnvelopeParam},
    error::Result,
    graph::node::RenderCtx,
};

/*
ADSR Envelope Implementation
============================

This module implements a linear ADSR envelope generator. Its output is a
gain between 0.0 and 1.0 that the voice multiplies into the carrier.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  gate        The note on/off signal. Velocity > 0 opens the gate (Attack),
              velocity 0 closes it (Release).

  increment   How much `level` changes per sample, derived from the stage
              duration and the sample rate.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release


The State Machine
-----------------

    ┌──────┐  note_on   ┌────────┐  level=1   ┌───────┐  level=S  ┌─────────┐
    │ Idle │ ─────────→ │ Attack │ ─────────→ │ Decay │ ────────→ │ Sustain │
    └──────┘            └────────┘            └───────┘           └─────────┘
        ↑                    │  note_off           │ note_off          │
        │    level=0    ┌─────────┐ ←──────────────┘                   │
        └────────────── │ Release │ ←──────────────────────────────────┘
                        └─────────┘

Continuity Rules
----------------

Nothing in this module ever jumps the level:

  - note_on from ANY stage enters Attack from the CURRENT level. A retrigger
    during Release ramps back up from wherever the release had got to.

  - note_off from ANY active stage enters Release from the CURRENT level.
    Releasing halfway through the attack fades out from that partial level.

  - Changing the sustain level while decaying or sustaining re-enters Decay
    from the current level, gliding to the new target over `decay` seconds.

A stage whose duration is shorter than one sample completes on the next
tick.


Implementation Notes
--------------------

Attack and Decay compute their increment fresh each sample, so a timing
change takes effect immediately and sample-rate changes are harmless.

Release is special: we snapshot the starting level and the release time at
note_off, then interpolate by elapsed samples. This guarantees we land on
exactly 0.0 and lets the release time be edited mid-release without
affecting the release already in progress.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate high, ramping up to 1.0
    Decay,   // Ramping towards the sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate low, ramping down to 0
}

#[derive(Debug, Clone)]
pub struct Envelope {
    // ADSR parameters
    attack_time: f32,   // seconds to ramp 0 → 1
    decay_time: f32,    // seconds to ramp 1 → sustain
    sustain_level: f32, // level to hold (0.0 - 1.0)
    release_time: f32,  // seconds to ramp current → 0

    // Runtime state (changes every sample)
    stage: EnvelopeState,
    level: f32,

    // Decay bookkeeping
    decay_start_level: f32, // level when decay began (usually 1.0)

    // Release bookkeeping, captured at note_off
    release_start_level: f32,
    release_snapshot_time: f32,
    release_elapsed_samples: u32,
}

impl Envelope {
    /// Build an envelope, rejecting sustain outside [0, 1] and any
    /// non-positive duration.
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Result<Self> {
        Self::from_config(&EnvelopeConfig::new(attack, decay, sustain, release))
    }

    pub fn from_config(config: &EnvelopeConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            attack_time: config.attack,
            decay_time: config.decay,
            sustain_level: config.sustain,
            release_time: config.release,

            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 1.0,
            release_start_level: 0.0,
            release_snapshot_time: config.release,
            release_elapsed_samples: 0,
        })
    }

    /// Gate high: (re)start the attack from the current level.
    pub fn note_on(&mut self) {
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: start the release phase from the current level.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_snapshot_time = self.release_time;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample. Called once per sample.
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        let sample_rate = ctx.sample_rate();

        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                // increment = 1.0 / (attack_time * sample_rate)
                let increment = 1.0 / (self.attack_time * sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                // Ramp from decay_start_level towards sustain_level. The start
                // can sit below the target after the sustain level was raised.
                let target = self.sustain_level;
                let step = (self.decay_start_level - target) / (self.decay_time * sample_rate);
                self.level -= step;

                let reached = if step >= 0.0 {
                    self.level <= target
                } else {
                    self.level >= target
                };
                if reached {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                // level = start * (1 - elapsed/total)
                let total_samples = (self.release_snapshot_time * sample_rate).round().max(1.0);
                let progress = self.release_elapsed_samples as f32 / total_samples;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples as f32 >= total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        self.level = self.level.clamp(0.0, 1.0);
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &mut RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(ctx);
            ctx.advance();
        }
    }

    pub fn set_attack(&mut self, seconds: f32) -> Result<()> {
        self.attack_time = EnvelopeParam::Attack.validate(seconds)?;
        Ok(())
    }

    pub fn set_decay(&mut self, seconds: f32) -> Result<()> {
        self.decay_time = EnvelopeParam::Decay.validate(seconds)?;
        Ok(())
    }

    /// Takes effect from the next release; a release in progress keeps the
    /// time it started with.
    pub fn set_release(&mut self, seconds: f32) -> Result<()> {
        self.release_time = EnvelopeParam::Release.validate(seconds)?;
        Ok(())
    }

    pub fn set_sustain(&mut self, level: f32) -> Result<()> {
        self.sustain_level = EnvelopeParam::Sustain.validate(level)?;

        if matches!(self.stage, EnvelopeState::Decay | EnvelopeState::Sustain) {
            self.decay_start_level = self.level;
            self.stage = EnvelopeState::Decay;
        }
        Ok(())
    }

    pub fn set(&mut self, param: EnvelopeParam, value: f32) -> Result<()> {
        match param {
            EnvelopeParam::Attack => self.set_attack(value),
            EnvelopeParam::Decay => self.set_decay(value),
            EnvelopeParam::Sustain => self.set_sustain(value),
            EnvelopeParam::Release => self.set_release(value),
        }
    }

    pub fn get(&self, param: EnvelopeParam) -> f32 {
        match param {
            EnvelopeParam::Attack => self.attack_time,
            EnvelopeParam::Decay => self.decay_time,
            EnvelopeParam::Sustain => self.sustain_level,
            EnvelopeParam::Release => self.release_time,
        }
    }

    pub fn describe_controls(&self) -> [ControlEntry; 4] {
        EnvelopeParam::ALL.map(|param| ControlEntry::new(ControlId::Envelope(param), self.get(param)))
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        let config = EnvelopeConfig::default();
        Self {
            attack_time: config.attack,
            decay_time: config.decay,
            sustain_level: config.sustain,
            release_time: config.release,
            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 1.0,
            release_start_level: 0.0,
            release_snapshot_time: config.release,
            release_elapsed_samples: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::new(SAMPLE_RATE).unwrap()
    }

    fn render_samples(env: &mut Envelope, samples: usize) -> Vec<f32> {
        let ctx = ctx();
        (0..samples).map(|_| env.next_sample(&ctx)).collect()
    }

    #[test]
    fn rejects_invalid_construction() {
        assert!(Envelope::adsr(0.0, 0.1, 0.5, 0.1).is_err());
        assert!(Envelope::adsr(0.1, -0.1, 0.5, 0.1).is_err());
        assert!(Envelope::adsr(0.1, 0.1, 1.5, 0.1).is_err());
        assert!(Envelope::adsr(0.1, 0.1, -0.5, 0.1).is_err());
        assert!(Envelope::adsr(0.1, 0.1, 0.5, 0.0).is_err());
        assert!(Envelope::adsr(0.1, 0.1, 0.5, f32::NAN).is_err());
    }

    #[test]
    fn long_segments_are_allowed() {
        let mut env = Envelope::adsr(12.0, 0.1, 0.5, 30.0).unwrap();
        env.note_on();
        render_samples(&mut env, (6.0 * SAMPLE_RATE) as usize);

        assert_eq!(env.state(), EnvelopeState::Attack);
        assert!((env.level() - 0.5).abs() < 1e-2);
        assert_eq!(env.get(EnvelopeParam::Release), 30.0);
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2).unwrap();

        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(0.01, 0.05, sustain, 0.2).unwrap();

        env.note_on();
        let attack_decay_samples = ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5;
        render_samples(&mut env, attack_decay_samples);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert_eq!(env.level(), sustain);
    }

    #[test]
    fn full_cycle_ends_exactly_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.02, 0.5, release).unwrap();

        env.note_on();
        render_samples(&mut env, 100);
        assert_eq!(env.state(), EnvelopeState::Sustain);

        env.note_off();
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn release_during_attack_is_continuous() {
        let mut env = Envelope::adsr(0.1, 0.2, 0.5, 0.5).unwrap();

        env.note_on();
        let mut levels = render_samples(&mut env, 30);
        let before_release = env.level();
        assert!(before_release < 1.0 && before_release > 0.0);

        env.note_off();
        assert_eq!(env.state(), EnvelopeState::Release);
        levels.extend(render_samples(&mut env, 600));

        // Attack step is 0.01/sample, release step is smaller: no larger jumps
        for pair in levels.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 0.0101, "jump {pair:?}");
        }
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn retrigger_starts_from_current_level() {
        let mut env = Envelope::adsr(0.1, 0.1, 0.5, 0.4).unwrap();

        env.note_on();
        render_samples(&mut env, 300);
        env.note_off();
        render_samples(&mut env, 100);
        let released_level = env.level();
        assert!(released_level > 0.0);

        env.note_on();
        let next = render_samples(&mut env, 1)[0];
        assert_eq!(env.state(), EnvelopeState::Attack);
        assert!(next > released_level);
        assert!(next - released_level <= 0.0101);
    }

    #[test]
    fn sustain_change_glides() {
        let mut env = Envelope::adsr(0.001, 0.1, 0.2, 0.4).unwrap();
        env.note_on();
        render_samples(&mut env, 200);
        assert_eq!(env.state(), EnvelopeState::Sustain);

        env.set_sustain(0.8).unwrap();
        let levels = render_samples(&mut env, 150);
        assert!((levels[0] - 0.2).abs() < 0.01);
        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert_eq!(env.level(), 0.8);
        for pair in levels.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn rejected_setter_keeps_previous_value() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2).unwrap();
        assert!(env.set_attack(0.0).is_err());
        assert!(env.set_sustain(2.0).is_err());
        assert_eq!(env.get(EnvelopeParam::Attack), 0.01);
        assert_eq!(env.get(EnvelopeParam::Sustain), 0.7);
    }

    #[test]
    fn sub_sample_segments_resolve_in_one_tick() {
        let mut env = Envelope::adsr(0.0001, 0.0001, 0.5, 0.0001).unwrap();
        env.note_on();
        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Decay);
        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Sustain);
        env.note_off();
        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }
}
