use std::f32::consts::FRAC_1_SQRT_2;

use tracing::info;

use crate::{
    config::VoiceConfig,
    control::{
        group_controls, validate_pitch_bend, ControlEntry, ControlGroup, ControlId,
        EnvelopeParam,
    },
    dsp::{
        envelope::{Envelope, EnvelopeState},
        oscillator::SinePhase,
        pan::{Panner, StereoFrame},
    },
    error::Result,
    graph::{
        envelope::EnvNode,
        node::{AudioSignal, RenderCtx},
        oscillator::{ModulatorOscillator, OscillatorParams},
        signal::{OscSlot, ParamValue, SignalBus, SignalRef},
    },
    io::{
        converter::{midi_note_to_freq, note_to_freq},
        midi::NoteEvent,
    },
    synth::message::VoiceMessage,
};

/*
Four-Oscillator FM Voice
========================

     ____            ____
    |    |          |    |
    | 3  |          |  4 |
    |____|          |____|
      ||              ||
     _\/_            _\/_
    |    |          |    |
    | 1  |          |  2 |
    |____|          |____|
      ||              ||
      \______ + _______/
             | |          + note frequency
            _\ /_
            | C |  × envelope
            |___|
             | |
            \ /
            PAN → (left, right)

Oscillators 3 and 4 modulate the frequencies of 1 and 2; 1 and 2 in turn
are added to the note frequency to drive the carrier C. Every oscillator
runs at `note × factor_mod`.

The wiring above is fixed when the voice is built. Only parameter values
(index, factor_mod, envelope timings, pan) change afterwards.

Evaluation Order
----------------

Each tick walks the graph in dependency order so every node reads upstream
values from the same tick:

    osc3, osc4  →  osc1, osc2  →  envelope  →  carrier  →  panner

Nothing on this path allocates, locks or can fail.

Transport
---------

A fresh voice starts itself on its first render. After an explicit
`stop()`, renders return silence and no phase moves until `play()`; the
voice then continues exactly where it paused. Oscillators suspended with
`set_oscillator_active(slot, false)` stay silent across play and stop.

Pitch
-----

    note frequency = freq(note) × 2^(bend / 12)

The bend survives note changes; `set_pitch` replaces the note part only.
*/

const RENDER_ORDER: [OscSlot; 4] = [OscSlot::Three, OscSlot::Four, OscSlot::One, OscSlot::Two];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Fresh,
    Playing,
    Stopped,
}

pub struct FmVoice {
    oscillators: [ModulatorOscillator; 4],
    carrier: SinePhase,
    envelope: EnvNode,
    panner: Panner,
    bus: SignalBus,
    suspended: [bool; 4],
    note: Option<u8>,
    base_frequency: f32,
    bend: f32,
    note_frequency: f32,
    carrier_frequency: f32,
    transport: Transport,
}

impl FmVoice {
    /// Validate `config`, then wire the fixed topology.
    pub fn new(config: VoiceConfig) -> Result<Self> {
        config.validate()?;

        let oscillators = [
            build_oscillator(OscSlot::One, &config)?,
            build_oscillator(OscSlot::Two, &config)?,
            build_oscillator(OscSlot::Three, &config)?,
            build_oscillator(OscSlot::Four, &config)?,
        ];
        let envelope = EnvNode::from_config(&config.envelope)?;
        let panner = Panner::new(config.pan)?;
        let note_frequency = midi_note_to_freq(0);

        info!(
            attack = config.envelope.attack,
            decay = config.envelope.decay,
            sustain = config.envelope.sustain,
            release = config.envelope.release,
            pan = config.pan,
            index_scale = config.index_scale,
            "fm voice created"
        );

        Ok(Self {
            oscillators,
            carrier: SinePhase::new(),
            envelope,
            panner,
            bus: SignalBus::with_note_frequency(note_frequency),
            suspended: [false; 4],
            note: None,
            base_frequency: note_frequency,
            bend: 0.0,
            note_frequency,
            carrier_frequency: note_frequency,
            transport: Transport::Fresh,
        })
    }

    // --- Note events -----------------------------------------------------

    /// Velocity 0 releases `note`; anything else sets the pitch and
    /// (re)triggers the envelope from its current level.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        if velocity == 0 {
            self.note_off(note);
            return;
        }

        self.note = Some(note);
        self.retune(midi_note_to_freq(note));
        self.envelope.note_on();
    }

    /// Release only if `note` is the one sounding, so overlapping key
    /// presses on a monophonic keyboard don't cut the newer note.
    pub fn note_off(&mut self, note: u8) {
        if self.note == Some(note) {
            self.envelope.note_off();
        }
    }

    pub fn all_notes_off(&mut self) {
        self.envelope.note_off();
    }

    pub fn handle_note(&mut self, event: NoteEvent) {
        self.note_on(event.pitch(), event.velocity());
    }

    /// Set the pitch from a continuous note number without retriggering.
    pub fn set_pitch(&mut self, note: f32) -> Result<()> {
        let frequency = note_to_freq(note)?;
        self.retune(frequency);
        Ok(())
    }

    /// Offset the pitch by `semitones` (±24). Applies to the sounding note
    /// and to every later one until changed.
    pub fn set_pitch_bend(&mut self, semitones: f32) -> Result<()> {
        self.bend = validate_pitch_bend(semitones)?;
        self.retune(self.base_frequency);
        Ok(())
    }

    pub fn pitch_bend(&self) -> f32 {
        self.bend
    }

    fn retune(&mut self, base_frequency: f32) {
        self.base_frequency = base_frequency;
        self.note_frequency = base_frequency * 2.0_f32.powf(self.bend / 12.0);
    }

    // --- Transport -------------------------------------------------------

    pub fn play(&mut self) {
        if self.transport == Transport::Playing {
            return;
        }
        self.transport = Transport::Playing;
        for (osc, suspended) in self.oscillators.iter_mut().zip(self.suspended) {
            if !suspended {
                osc.play();
            }
        }
        self.envelope.play();
    }

    pub fn stop(&mut self) {
        if self.transport == Transport::Stopped {
            return;
        }
        self.transport = Transport::Stopped;
        for osc in &mut self.oscillators {
            osc.stop();
        }
        self.envelope.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.transport == Transport::Playing
    }

    /// Suspend or resume one oscillator. A suspended oscillator contributes
    /// 0 Hz and is not evaluated. A resumed one only runs while the voice
    /// is playing.
    pub fn set_oscillator_active(&mut self, slot: OscSlot, active: bool) {
        self.suspended[slot.index()] = !active;
        let osc = &mut self.oscillators[slot.index()];
        if !active {
            osc.deactivate();
        } else if self.transport == Transport::Playing {
            osc.activate();
        }
    }

    /// False only for slots suspended with
    /// [`set_oscillator_active`](Self::set_oscillator_active).
    pub fn is_oscillator_enabled(&self, slot: OscSlot) -> bool {
        !self.suspended[slot.index()]
    }

    // --- Parameters ------------------------------------------------------

    pub fn set_index(&mut self, slot: OscSlot, index: impl Into<ParamValue>) -> Result<()> {
        self.oscillators[slot.index()].set_index(index)
    }

    pub fn set_factor_mod(&mut self, slot: OscSlot, factor_mod: impl Into<ParamValue>) -> Result<()> {
        self.oscillators[slot.index()].set_factor_mod(factor_mod)
    }

    pub fn set_envelope(&mut self, param: EnvelopeParam, value: f32) -> Result<()> {
        self.envelope.envelope_mut().set(param, value)
    }

    pub fn set_pan(&mut self, position: f32) -> Result<()> {
        self.panner.set_position(position)
    }

    /// Generic by-address setter used by control surfaces.
    pub fn set_control(&mut self, id: ControlId, value: f32) -> Result<()> {
        match id {
            ControlId::Index(slot) => self.set_index(slot, value),
            ControlId::FactorMod(slot) => self.set_factor_mod(slot, value),
            ControlId::Envelope(param) => self.set_envelope(param, value),
        }
    }

    pub fn control_value(&self, id: ControlId) -> f32 {
        self.describe_controls()[id.position()].descriptor.value
    }

    /// Index and factor_mod of all four oscillators, then the envelope's
    /// attack, decay, sustain and release.
    pub fn describe_controls(&self) -> Vec<ControlEntry> {
        let mut entries = Vec::with_capacity(ControlId::ALL.len());
        for slot in OscSlot::ALL {
            entries.extend(self.oscillators[slot.index()].describe_controls(slot));
        }
        entries.extend(self.envelope.envelope().describe_controls());
        entries
    }

    /// Same entries as [`describe_controls`](Self::describe_controls),
    /// grouped as "Oscillator 1" … "Oscillator 4 (2)", "Envelope".
    pub fn describe_control_groups(&self) -> Vec<ControlGroup> {
        group_controls(&self.describe_controls())
    }

    /// Apply a message from the control queue.
    pub fn apply(&mut self, message: VoiceMessage) -> Result<()> {
        match message {
            VoiceMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            VoiceMessage::NoteOff { note } => self.note_off(note),
            VoiceMessage::AllNotesOff => self.all_notes_off(),
            VoiceMessage::SetControl { id, value } => self.set_control(id, value)?,
            VoiceMessage::SetPan(position) => self.set_pan(position)?,
            VoiceMessage::PitchBend(semitones) => self.set_pitch_bend(semitones)?,
            VoiceMessage::Play => self.play(),
            VoiceMessage::Stop => self.stop(),
        }
        Ok(())
    }

    // --- Inspection ------------------------------------------------------

    pub fn oscillator(&self, slot: OscSlot) -> &ModulatorOscillator {
        &self.oscillators[slot.index()]
    }

    pub fn envelope(&self) -> &Envelope {
        self.envelope.envelope()
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn envelope_state(&self) -> EnvelopeState {
        self.envelope.state()
    }

    /// True while the envelope is anywhere but Idle.
    pub fn is_sounding(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn current_note(&self) -> Option<u8> {
        self.note
    }

    pub fn note_frequency(&self) -> f32 {
        self.note_frequency
    }

    /// Carrier frequency used for the most recent sample, in Hz.
    pub fn carrier_frequency(&self) -> f32 {
        self.carrier_frequency
    }

    pub fn pan(&self) -> f32 {
        self.panner.position()
    }

    // --- Rendering -------------------------------------------------------

    /// Compute one stereo frame. Never fails, never allocates.
    pub fn render(&mut self, ctx: &RenderCtx) -> StereoFrame {
        if self.transport == Transport::Fresh {
            self.play();
        }
        if self.transport != Transport::Playing {
            return StereoFrame::SILENCE;
        }

        self.bus.note_frequency = self.note_frequency;

        for slot in RENDER_ORDER {
            let osc = &mut self.oscillators[slot.index()];
            let sample = if osc.is_active() {
                osc.next_frame(&self.bus, ctx)
            } else {
                0.0
            };
            self.bus.set_oscillator(slot, sample);
        }

        let level = self.envelope.next_frame(&self.bus, ctx);
        self.bus.envelope = level;

        self.carrier_frequency = self.note_frequency
            + self.bus.oscillator(OscSlot::One)
            + self.bus.oscillator(OscSlot::Two);
        let sample = self.carrier.next(self.carrier_frequency, ctx.sample_rate()) * level;

        self.panner.process(sample)
    }

    /// Alias of [`render`](Self::render) for hosts that pull one frame at a
    /// time from the voice's output.
    #[inline]
    pub fn out(&mut self, ctx: &RenderCtx) -> StereoFrame {
        self.render(ctx)
    }

    /// Fill `out` with consecutive frames, advancing `ctx` once per frame.
    pub fn render_block(&mut self, out: &mut [StereoFrame], ctx: &mut RenderCtx) {
        for frame in out.iter_mut() {
            *frame = self.render(ctx);
            ctx.advance();
        }
    }

    /// Render into an interleaved device buffer with `channels` channels.
    ///
    /// Left and right go to the first two channels and any extra channels
    /// are silent. A mono buffer gets the equal-power downmix.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize, ctx: &mut RenderCtx) {
        if channels == 0 {
            return;
        }

        for chunk in out.chunks_mut(channels) {
            let frame = self.render(ctx);
            ctx.advance();

            match chunk {
                [mono] => *mono = (frame.left + frame.right) * FRAC_1_SQRT_2,
                [left, right, rest @ ..] => {
                    *left = frame.left;
                    *right = frame.right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }
}

impl AudioSignal for FmVoice {
    type Frame = StereoFrame;

    fn play(&mut self) {
        FmVoice::play(self);
    }

    fn stop(&mut self) {
        FmVoice::stop(self);
    }

    fn is_playing(&self) -> bool {
        FmVoice::is_playing(self)
    }

    /// The voice is a root node: it computes its own bus and ignores `inputs`.
    fn next_frame(&mut self, _inputs: &SignalBus, ctx: &RenderCtx) -> StereoFrame {
        self.render(ctx)
    }
}

fn build_oscillator(slot: OscSlot, config: &VoiceConfig) -> Result<ModulatorOscillator> {
    let settings = config.oscillator(slot);
    let mut params = OscillatorParams::new(SignalRef::NoteFrequency)
        .identifier(slot.identifier())
        .index(settings.index)
        .factor_mod(settings.factor_mod);

    if let Some(modulator) = slot.modulator() {
        params = params.modulation(SignalRef::Oscillator(modulator));
    }

    ModulatorOscillator::new(params, config.index_scale)
}
