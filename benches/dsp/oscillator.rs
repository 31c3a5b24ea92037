//! Benchmarks for the phase-accumulating sine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_voice::dsp::oscillator::SinePhase;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Fixed frequency - f64 phase update plus sin()
        let mut osc = SinePhase::new();
        group.bench_with_input(BenchmarkId::new("sine_fixed", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = osc.next(black_box(440.0), SAMPLE_RATE);
                }
            })
        });

        // Frequency changing every sample, as the carrier sees under FM
        let mut osc = SinePhase::new();
        let mut lfo = SinePhase::new();
        group.bench_with_input(BenchmarkId::new("sine_swept", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    let freq = 440.0 + 300.0 * lfo.next(5.0, SAMPLE_RATE);
                    *sample = osc.next(black_box(freq), SAMPLE_RATE);
                }
            })
        });
    }

    group.finish();
}
