//! Benchmarks for the complete FM voice.
//!
//! Patches range from a bare carrier to all four oscillators at full index,
//! which is the worst case the render path can see.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_voice::{
    config::{EnvelopeConfig, OscillatorConfig},
    dsp::pan::StereoFrame,
    graph::{node::RenderCtx, OscSlot},
    FmVoice, VoiceConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn patch(indices: [u8; 4]) -> VoiceConfig {
    let mut config = VoiceConfig::default().with_envelope(EnvelopeConfig::new(0.01, 0.2, 0.7, 0.3));
    for (slot, index) in OscSlot::ALL.into_iter().zip(indices) {
        config = config.with_oscillator(slot, OscillatorConfig::new(index, 1.5));
    }
    config
}

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    let patches = [
        ("carrier_only", [0, 0, 0, 0]),
        ("two_operator", [3, 0, 0, 0]),
        ("four_operator", [4, 3, 5, 2]),
        ("full_index", [20, 20, 20, 20]),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![StereoFrame::SILENCE; size];

        for (name, indices) in patches {
            let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
            let mut voice = FmVoice::new(patch(indices)).unwrap();
            voice.note_on(57, 100);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    voice.render_block(black_box(&mut buffer), &mut ctx);
                })
            });
        }

        // Interleaved stereo output, as an audio callback writes it
        let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
        let mut voice = FmVoice::new(patch([4, 3, 5, 2])).unwrap();
        voice.note_on(57, 100);
        let mut interleaved = vec![0.0f32; size * 2];
        group.bench_with_input(BenchmarkId::new("interleaved", size), &size, |b, _| {
            b.iter(|| {
                voice.render_interleaved(black_box(&mut interleaved), 2, &mut ctx);
            })
        });

        // One control change per block, queued from the control side and
        // drained at the block boundary
        let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();
        let (mut shared, mut handle) = FmVoice::with_handle(patch([4, 3, 5, 2])).unwrap();
        handle.note_on(57, 100).unwrap();
        let mut index = 0u8;
        group.bench_with_input(BenchmarkId::new("with_control_change", size), &size, |b, _| {
            b.iter(|| {
                index = (index + 1) % 20;
                handle.set_index(OscSlot::Three, index).unwrap();
                shared.render_block(black_box(&mut buffer), &mut ctx);
            })
        });
    }

    group.finish();
}
