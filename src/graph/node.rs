use crate::{
    error::{FmError, Result},
    graph::signal::SignalBus,
};

/// Context passed to graph nodes during rendering
///
/// Replaces a global audio server: the host owns one of these, hands it to
/// every render call and advances it once per rendered frame.
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - tick: Number of frames rendered so far
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    sample_rate: f32,
    tick: u64,
}

impl RenderCtx {
    /// Rejects sample rates that would turn phase increments into NaN or ∞.
    pub fn new(sample_rate: f32) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(FmError::InvalidArgument {
                what: "sample_rate",
                reason: "must be a finite, positive number of samples per second",
            });
        }

        Ok(Self {
            sample_rate,
            tick: 0,
        })
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current playback time in seconds
    pub fn time(&self) -> f64 {
        self.tick as f64 / self.sample_rate as f64
    }

    #[inline]
    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}

/// Capability shared by every node of the voice graph.
///
/// A node can be started and stopped, and produces one frame per tick. The
/// `inputs` bus carries the values already computed this tick by the node's
/// upstream neighbours; root nodes ignore it.
pub trait AudioSignal: Send {
    type Frame: Copy + Default;

    /// Start producing output. Calling it twice is a no-op.
    fn play(&mut self);

    /// Suspend computation while keeping all parameters. Calling it twice is
    /// a no-op. A stopped node returns `Frame::default()` and does not
    /// advance its internal state.
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    fn next_frame(&mut self, inputs: &SignalBus, ctx: &RenderCtx) -> Self::Frame;

    /// Fill `out` with consecutive frames, advancing `ctx` once per frame.
    fn render_block(&mut self, out: &mut [Self::Frame], inputs: &SignalBus, ctx: &mut RenderCtx) {
        for frame in out.iter_mut() {
            *frame = self.next_frame(inputs, ctx);
            ctx.advance();
        }
    }
}

/// Allow boxed nodes to be used as nodes (for dynamic dispatch)
impl<T: AudioSignal + ?Sized> AudioSignal for Box<T> {
    type Frame = T::Frame;

    fn play(&mut self) {
        (**self).play()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn next_frame(&mut self, inputs: &SignalBus, ctx: &RenderCtx) -> Self::Frame {
        (**self).next_frame(inputs, ctx)
    }
}
