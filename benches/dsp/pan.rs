//! Benchmarks for the equal-power panner.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_voice::dsp::pan::{Panner, StereoFrame};

use crate::BLOCK_SIZES;

pub fn bench_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/pan");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.01).sin()).collect();
        let mut output = vec![StereoFrame::SILENCE; size];

        let panner = Panner::new(0.3).unwrap();
        group.bench_with_input(BenchmarkId::new("process", size), &size, |b, _| {
            b.iter(|| {
                for (frame, &sample) in output.iter_mut().zip(&input) {
                    *frame = panner.process(black_box(sample));
                }
            })
        });

        // Gains are recomputed on every position change
        let mut panner = Panner::centered();
        group.bench_with_input(BenchmarkId::new("automated", size), &size, |b, _| {
            b.iter(|| {
                for (i, (frame, &sample)) in output.iter_mut().zip(&input).enumerate() {
                    let _ = panner.set_position((i as f32 / size as f32) * 2.0 - 1.0);
                    *frame = panner.process(black_box(sample));
                }
            })
        });
    }

    group.finish();
}
