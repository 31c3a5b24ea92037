use fm_voice::{
    config::{EnvelopeConfig, OscillatorConfig, DEFAULT_INDEX_SCALE},
    control::{ControlId, EnvelopeParam, Resolution},
    dsp::{envelope::Envelope, pan::StereoFrame, EnvelopeState},
    graph::{
        oscillator::{ModulatorOscillator, OscillatorParams},
        AudioSignal, OscSlot, RenderCtx, SignalBus, SignalRef,
    },
    io::{midi_note_to_freq, note_to_freq},
    FmError, FmVoice, VoiceConfig,
};

const SAMPLE_RATE: f32 = 48_000.0;

fn render(voice: &mut FmVoice, ctx: &mut RenderCtx, frames: usize) -> Vec<StereoFrame> {
    let mut out = vec![StereoFrame::SILENCE; frames];
    voice.render_block(&mut out, ctx);
    out
}

fn modulated_config() -> VoiceConfig {
    VoiceConfig::default()
        .with_envelope(EnvelopeConfig::new(0.02, 0.1, 0.5, 0.1))
        .with_oscillator(OscSlot::One, OscillatorConfig::new(4, 1.0))
        .with_oscillator(OscSlot::Two, OscillatorConfig::new(2, 2.5))
        .with_oscillator(OscSlot::Three, OscillatorConfig::new(6, 0.5))
        .with_oscillator(OscSlot::Four, OscillatorConfig::new(3, 3.0))
}

#[test]
fn tuning_is_anchored_at_a4() {
    assert_eq!(midi_note_to_freq(69), 440.0);
    assert_eq!(midi_note_to_freq(81), 880.0);
    assert_eq!(note_to_freq(69.0).unwrap(), 440.0);

    let mut previous = 0.0;
    for note in 0..=127u8 {
        let freq = midi_note_to_freq(note);
        assert!(freq > previous);
        previous = freq;
    }
}

#[test]
fn unmodulated_carrier_tracks_the_note() {
    let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
    let mut voice = FmVoice::new(VoiceConfig::default()).unwrap();

    for note in [0u8, 33, 60, 69, 96, 127] {
        voice.note_on(note, 100);
        for _ in 0..256 {
            voice.render(&ctx);
            ctx.advance();
            assert_eq!(voice.carrier_frequency(), midi_note_to_freq(note));
        }
    }
}

#[test]
fn oscillator_peak_is_index_times_scale() {
    let ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
    let bus = SignalBus::with_note_frequency(440.0);

    for index in [1u8, 5, 20] {
        for factor_mod in [0.25f32, 1.0, 3.7] {
            let params = OscillatorParams::new(SignalRef::NoteFrequency)
                .index(index)
                .factor_mod(factor_mod);
            let mut osc = ModulatorOscillator::new(params, DEFAULT_INDEX_SCALE).unwrap();
            osc.play();

            // Enough samples to cover several periods of the slowest case.
            let peak = (0..48_000)
                .map(|_| osc.next_frame(&bus, &ctx).abs())
                .fold(0.0f32, f32::max);
            let expected = index as f32 * DEFAULT_INDEX_SCALE;
            assert!(
                (peak - expected).abs() <= expected * 1e-3,
                "index {index}, factor {factor_mod}: peak {peak}, expected {expected}"
            );
        }
    }
}

#[test]
fn early_release_is_continuous() {
    let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
    let mut voice = FmVoice::new(VoiceConfig::default().with_envelope(EnvelopeConfig::new(
        0.1, 0.1, 0.5, 0.2,
    )))
    .unwrap();

    voice.note_on(60, 100);
    render(&mut voice, &mut ctx, 1_000);
    assert_eq!(voice.envelope_state(), EnvelopeState::Attack);
    let before = voice.envelope_level();
    assert!(before > 0.0 && before < 1.0);

    voice.note_on(60, 0);
    assert_eq!(voice.envelope_state(), EnvelopeState::Release);
    // Each release step stays close to the previous level: no jump back up
    // to 1.0 and no drop to 0.
    let mut previous = before;
    for _ in 0..100 {
        render(&mut voice, &mut ctx, 1);
        let level = voice.envelope_level();
        assert!(level <= previous);
        assert!(previous - level < 1e-3);
        previous = level;
    }
    assert!(previous < before);
}

#[test]
fn full_cycle_ends_idle_at_zero() {
    let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
    let config = EnvelopeConfig::new(0.01, 0.05, 0.4, 0.08);
    let mut voice = FmVoice::new(VoiceConfig::default().with_envelope(config)).unwrap();

    voice.note_on(64, 100);
    render(&mut voice, &mut ctx, (0.2 * SAMPLE_RATE) as usize);
    assert_eq!(voice.envelope_state(), EnvelopeState::Sustain);

    voice.note_off(64);
    let tail = render(&mut voice, &mut ctx, (0.1 * SAMPLE_RATE) as usize);

    assert_eq!(voice.envelope_state(), EnvelopeState::Idle);
    assert_eq!(voice.envelope_level(), 0.0);
    assert!(!voice.is_sounding());
    let last = tail.last().copied().unwrap_or_default();
    assert_eq!(last.left.abs() + last.right.abs(), 0.0);
}

#[test]
fn stop_play_keeps_parameters_and_phase() {
    let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
    let mut reference_ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
    let mut voice = FmVoice::new(modulated_config()).unwrap();
    let mut reference = FmVoice::new(modulated_config()).unwrap();

    for v in [&mut voice, &mut reference] {
        v.note_on(57, 100);
        v.set_control(ControlId::Index(OscSlot::Two), 9.0).unwrap();
        v.set_control(ControlId::FactorMod(OscSlot::Four), 1.25).unwrap();
    }

    render(&mut voice, &mut ctx, 777);
    render(&mut reference, &mut reference_ctx, 777);

    voice.stop();
    let paused = render(&mut voice, &mut ctx, 128);
    assert!(paused.iter().all(|f| *f == StereoFrame::SILENCE));
    voice.play();

    assert_eq!(voice.control_value(ControlId::Index(OscSlot::Two)), 9.0);
    assert_eq!(voice.control_value(ControlId::FactorMod(OscSlot::Four)), 1.25);
    assert_eq!(
        render(&mut voice, &mut ctx, 512),
        render(&mut reference, &mut reference_ctx, 512)
    );
}

#[test]
fn out_of_range_parameters_never_reach_the_render_path() {
    let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
    let mut voice = FmVoice::new(modulated_config()).unwrap();
    voice.note_on(72, 127);

    let err = voice.set_index(OscSlot::One, -3.0f32).unwrap_err();
    assert!(matches!(err, FmError::OutOfRange { .. }));
    let err = voice.set_factor_mod(OscSlot::Three, 10.0f32).unwrap_err();
    assert!(matches!(err, FmError::OutOfRange { .. }));
    assert!(voice.set_index(OscSlot::One, 2.5f32).is_err());
    assert!(voice.set_envelope(EnvelopeParam::Sustain, 1.1).is_err());
    assert!(voice.set_envelope(EnvelopeParam::Attack, -1.0).is_err());

    assert_eq!(voice.control_value(ControlId::Index(OscSlot::One)), 4.0);
    assert_eq!(voice.control_value(ControlId::FactorMod(OscSlot::Three)), 0.5);

    for frame in render(&mut voice, &mut ctx, 4_800) {
        assert!(frame.is_finite());
    }
}

#[test]
fn invalid_construction_is_rejected() {
    assert!(Envelope::adsr(0.0, 0.1, 0.5, 0.1).is_err());
    assert!(Envelope::adsr(0.1, 0.1, 1.5, 0.1).is_err());
    assert!(RenderCtx::new(0.0).is_err());

    let raw_base = OscillatorParams::new(SignalRef::Oscillator(OscSlot::Three));
    assert!(matches!(
        ModulatorOscillator::new(raw_base, DEFAULT_INDEX_SCALE),
        Err(FmError::InvalidArgument { .. })
    ));

    let bad_voice =
        VoiceConfig::default().with_oscillator(OscSlot::Two, OscillatorConfig::new(0, 4.5));
    assert!(FmVoice::new(bad_voice).is_err());
}

#[test]
fn control_surface_lists_oscillators_then_envelope() {
    let voice = FmVoice::new(modulated_config()).unwrap();
    let groups = voice.describe_control_groups();

    let titles: Vec<&str> = groups.iter().map(|g| g.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Oscillator 1", "Oscillator 2", "Oscillator 3 (1)", "Oscillator 4 (2)", "Envelope"]
    );

    for group in &groups[..4] {
        let index = &group.controls[0].descriptor;
        assert_eq!(index.name, "index");
        assert_eq!((index.range.min, index.range.max), (0.0, 20.0));
        assert_eq!(index.resolution, Resolution::Integer);

        let factor = &group.controls[1].descriptor;
        assert_eq!(factor.name, "factor_mod");
        assert_eq!((factor.range.min, factor.range.max), (0.0, 4.0));
        assert_eq!(factor.resolution, Resolution::Continuous);
    }

    let envelope: Vec<(&str, f32)> = groups[4]
        .controls
        .iter()
        .map(|c| (c.descriptor.name, c.descriptor.value))
        .collect();
    assert_eq!(
        envelope,
        [("attack", 0.02), ("decay", 0.1), ("sustain", 0.5), ("release", 0.1)]
    );
}

#[test]
fn centered_pan_is_equal_power() {
    let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
    let mut voice = FmVoice::new(modulated_config()).unwrap();
    voice.note_on(60, 100);

    for frame in render(&mut voice, &mut ctx, 2_000) {
        assert!((frame.left - frame.right).abs() < 1e-6);
    }
}
