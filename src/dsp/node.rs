/// Context passed to every stage while rendering a sample
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Seconds since the engine started
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Nyquist frequency for this context
    pub fn nyquist(&self) -> f32 {
        self.sample_rate * 0.5
    }
}

/// Trait for stages whose parameters can be read and edited by a controller
///
/// Values travel as `f32` so one message type covers every stage. Booleans
/// are encoded as `0.0`/`1.0`, enums as their index. `set_param` clamps to the
/// valid range rather than rejecting.
pub trait Parameterized: Send {
    type Param: Copy + Send;

    fn get_param(&self, param: Self::Param) -> f32;

    fn set_param(&mut self, param: Self::Param, value: f32);
}

#[inline]
pub(crate) fn flag(value: f32) -> bool {
    value != 0.0
}

#[inline]
pub(crate) fn from_flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}
