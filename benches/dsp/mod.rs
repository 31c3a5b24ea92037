//! Benchmarks for low-level DSP primitives.

mod envelope;
mod oscillator;
mod pan;

pub use envelope::bench_envelope;
pub use oscillator::bench_oscillator;
pub use pan::bench_pan;
