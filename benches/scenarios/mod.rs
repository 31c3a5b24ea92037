//! Benchmarks for whole-voice patches.

mod voice;

pub use voice::bench_voice;
