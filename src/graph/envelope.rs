use crate::{
    config::EnvelopeConfig,
    dsp::envelope::{Envelope, EnvelopeState},
    error::Result,
    graph::{
        node::{AudioSignal, RenderCtx},
        signal::SignalBus,
    },
};

/// Envelope generator exposed as a graph node.
///
/// While stopped the envelope is frozen: it outputs silence and its stage
/// does not advance, but note events still update the gate.
pub struct EnvNode {
    env: Envelope,
    playing: bool,
}

impl EnvNode {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Result<Self> {
        Ok(Self::wrap(Envelope::adsr(attack, decay, sustain, release)?))
    }

    pub fn from_config(config: &EnvelopeConfig) -> Result<Self> {
        Ok(Self::wrap(Envelope::from_config(config)?))
    }

    fn wrap(env: Envelope) -> Self {
        Self {
            env,
            playing: false,
        }
    }

    pub fn note_on(&mut self) {
        self.env.note_on();
    }

    pub fn note_off(&mut self) {
        self.env.note_off();
    }

    pub fn envelope(&self) -> &Envelope {
        &self.env
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.env
    }

    pub fn level(&self) -> f32 {
        self.env.level()
    }

    pub fn state(&self) -> EnvelopeState {
        self.env.state()
    }

    /// Check if envelope is currently active (not Idle)
    pub fn is_active(&self) -> bool {
        self.env.is_active()
    }
}

impl AudioSignal for EnvNode {
    type Frame = f32;

    fn play(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn next_frame(&mut self, _inputs: &SignalBus, ctx: &RenderCtx) -> f32 {
        if !self.playing {
            return 0.0;
        }
        self.env.next_sample(ctx)
    }
}
