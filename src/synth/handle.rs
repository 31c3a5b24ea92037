#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};
#[cfg(feature = "rtrb")]
use tracing::{debug, warn};

#[cfg(feature = "rtrb")]
use crate::{
    config::VoiceConfig,
    control::{validate_pan, validate_pitch_bend, ControlEntry, ControlId, EnvelopeParam},
    error::{FmError, Result},
    graph::signal::OscSlot,
    io::{converter::midi_to_message, midi::MidiEvent, midi::NoteEvent},
    synth::message::VoiceMessage,
};
use crate::{
    dsp::pan::StereoFrame,
    graph::node::RenderCtx,
    synth::{
        message::MessageReceiver,
        voice::FmVoice,
    },
};

/// Capacity of the control → render queue.
pub const CONTROL_QUEUE_SIZE: usize = 256;

/// Render-thread side of a voice: owns the [`FmVoice`] and drains pending
/// control messages at the start of every block.
pub struct SharedFmVoice<R: MessageReceiver> {
    voice: FmVoice,
    rx: R,
    rejected: u64,
}

impl<R: MessageReceiver> SharedFmVoice<R> {
    pub fn new(voice: FmVoice, rx: R) -> Self {
        Self {
            voice,
            rx,
            rejected: 0,
        }
    }

    /// Apply every queued message. A message the voice rejects leaves the
    /// previous value in place and is counted in
    /// [`rejected_messages`](Self::rejected_messages).
    pub fn drain(&mut self) {
        while let Some(message) = self.rx.pop() {
            if self.voice.apply(message).is_err() {
                self.rejected += 1;
            }
        }
    }

    /// Messages dropped by [`drain`](Self::drain) since construction. Always
    /// 0 behind a [`VoiceHandle`], which validates before queueing.
    pub fn rejected_messages(&self) -> u64 {
        self.rejected
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame], ctx: &mut RenderCtx) {
        self.drain();
        self.voice.render_block(out, ctx);
    }

    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize, ctx: &mut RenderCtx) {
        self.drain();
        self.voice.render_interleaved(out, channels, ctx);
    }

    pub fn voice(&self) -> &FmVoice {
        &self.voice
    }

    pub fn voice_mut(&mut self) -> &mut FmVoice {
        &mut self.voice
    }

    pub fn into_inner(self) -> FmVoice {
        self.voice
    }
}

#[cfg(feature = "rtrb")]
impl FmVoice {
    /// Build a voice for a realtime host.
    ///
    /// The render side goes to the audio callback; the [`VoiceHandle`] stays
    /// on the control thread.
    pub fn with_handle(
        config: VoiceConfig,
    ) -> Result<(SharedFmVoice<Consumer<VoiceMessage>>, VoiceHandle)> {
        let voice = FmVoice::new(config)?;
        let (tx, rx) = RingBuffer::<VoiceMessage>::new(CONTROL_QUEUE_SIZE);

        let mut controls = [0.0; ControlId::ALL.len()];
        for entry in voice.describe_controls() {
            controls[entry.id.position()] = entry.descriptor.value;
        }

        let handle = VoiceHandle {
            tx,
            controls,
            pan: voice.pan(),
            bend: voice.pitch_bend(),
            note: None,
        };
        Ok((SharedFmVoice::new(voice, rx), handle))
    }
}

/// Control-thread side of a voice.
///
/// Every request is validated here, before it is queued, so the render
/// thread never sees a value it would reject. The handle mirrors the values
/// it has sent so UIs can read them back without touching the voice.
#[cfg(feature = "rtrb")]
pub struct VoiceHandle {
    tx: Producer<VoiceMessage>,
    controls: [f32; ControlId::ALL.len()],
    pan: f32,
    bend: f32,
    note: Option<u8>,
}

#[cfg(feature = "rtrb")]
impl VoiceHandle {
    fn send(&mut self, message: VoiceMessage) -> Result<()> {
        self.tx.push(message).map_err(|_| {
            warn!(?message, "control queue full, message dropped");
            FmError::QueueFull
        })
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) -> Result<()> {
        let event = NoteEvent::new(note, velocity)?;
        if event.is_note_off() {
            return self.note_off(note);
        }

        self.send(VoiceMessage::NoteOn { note, velocity })?;
        debug!(note, velocity, "note on");
        self.note = Some(note);
        Ok(())
    }

    pub fn note_off(&mut self, note: u8) -> Result<()> {
        NoteEvent::new(note, 0)?;
        self.send(VoiceMessage::NoteOff { note })?;
        debug!(note, "note off");
        if self.note == Some(note) {
            self.note = None;
        }
        Ok(())
    }

    pub fn all_notes_off(&mut self) -> Result<()> {
        self.send(VoiceMessage::AllNotesOff)?;
        self.note = None;
        Ok(())
    }

    /// Forward a decoded MIDI event. Events on other channels, and events
    /// the voice has no use for, are ignored.
    pub fn handle_midi(&mut self, event: MidiEvent, channel: u8) -> Result<()> {
        match midi_to_message(event, channel) {
            Some(VoiceMessage::NoteOn { note, velocity }) => self.note_on(note, velocity),
            Some(VoiceMessage::NoteOff { note }) => self.note_off(note),
            Some(VoiceMessage::AllNotesOff) => self.all_notes_off(),
            Some(VoiceMessage::PitchBend(semitones)) => self.set_pitch_bend(semitones),
            Some(message) => self.send(message),
            None => Ok(()),
        }
    }

    pub fn set_control(&mut self, id: ControlId, value: f32) -> Result<()> {
        let value = id.validate(value).map_err(|err| {
            warn!(control = %id.group_title(), name = id.name(), %err, "control change rejected");
            err
        })?;
        self.send(VoiceMessage::SetControl { id, value })?;
        self.controls[id.position()] = value;
        Ok(())
    }

    pub fn set_index(&mut self, slot: OscSlot, index: u8) -> Result<()> {
        self.set_control(ControlId::Index(slot), index as f32)
    }

    pub fn set_factor_mod(&mut self, slot: OscSlot, factor_mod: f32) -> Result<()> {
        self.set_control(ControlId::FactorMod(slot), factor_mod)
    }

    pub fn set_envelope(&mut self, param: EnvelopeParam, value: f32) -> Result<()> {
        self.set_control(ControlId::Envelope(param), value)
    }

    pub fn set_pan(&mut self, position: f32) -> Result<()> {
        let position = validate_pan(position).map_err(|err| {
            warn!(%err, "pan change rejected");
            err
        })?;
        self.send(VoiceMessage::SetPan(position))?;
        self.pan = position;
        Ok(())
    }

    pub fn set_pitch_bend(&mut self, semitones: f32) -> Result<()> {
        let semitones = validate_pitch_bend(semitones).map_err(|err| {
            warn!(%err, "pitch bend rejected");
            err
        })?;
        self.send(VoiceMessage::PitchBend(semitones))?;
        self.bend = semitones;
        Ok(())
    }

    pub fn play(&mut self) -> Result<()> {
        self.send(VoiceMessage::Play)?;
        debug!("transport play");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.send(VoiceMessage::Stop)?;
        debug!("transport stop");
        Ok(())
    }

    /// Last accepted value for `id`.
    pub fn control_value(&self, id: ControlId) -> f32 {
        self.controls[id.position()]
    }

    pub fn describe_controls(&self) -> Vec<ControlEntry> {
        ControlId::ALL
            .iter()
            .map(|&id| ControlEntry::new(id, self.control_value(id)))
            .collect()
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn pitch_bend(&self) -> f32 {
        self.bend
    }

    pub fn current_note(&self) -> Option<u8> {
        self.note
    }

    /// Free slots left in the queue.
    pub fn available(&self) -> usize {
        self.tx.slots()
    }
}
