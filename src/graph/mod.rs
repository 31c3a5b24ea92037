//! The voice's modulation graph.
//!
//! Graph nodes wrap the low-level DSP primitives with what the voice needs to
//! wire them: parameters that read either a constant or an upstream signal,
//! a per-tick signal bus, and transport state.

/// Envelope generator node exposing ADSR state.
pub mod envelope;
/// Core traits shared by all graph nodes.
pub mod node;
/// Sine oscillator whose output is a frequency deviation.
pub mod oscillator;
/// Signal addresses, parameter values and the per-tick bus.
pub mod signal;

pub use node::{AudioSignal, RenderCtx};
pub use signal::{OscSlot, ParamValue, SignalBus, SignalRef};
