//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_voice::dsp::envelope::Envelope;
use fm_voice::graph::node::RenderCtx;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let mut ctx = RenderCtx::new(SAMPLE_RATE).unwrap();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::adsr(5.0, 0.1, 0.7, 0.3).unwrap();
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), &mut ctx);
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.3).unwrap();
        env.note_on();
        // Advance past attack/decay
        for _ in 0..200 {
            env.next_sample(&ctx);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), &mut ctx);
            })
        });

        // Release phase (ramping down)
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 10.0).unwrap();
        env.note_on();
        for _ in 0..200 {
            env.next_sample(&ctx);
        }
        env.note_off();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), &mut ctx);
            })
        });
    }

    group.finish();
}
