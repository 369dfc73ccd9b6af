//! Signal-processing stages of the engine.
//!
//! Each stage owns its parameters and state and processes one sample at a
//! time. Stages are bypassable: a disabled stage returns its input untouched,
//! bit for bit. The engine composes them into a fixed pipeline; nothing in
//! here knows about the other stages except the chorus, which reads the delay
//! line's buffer.

/// Modulated read into the delay line's buffer.
pub mod chorus;
/// Feedback echo with a growing, trimmed buffer.
pub mod delay;
/// Reverb, delay and chorus applied in a fixed order.
pub mod effects;
/// Time-based ADSR envelope shared by the whole mix.
pub mod envelope;
/// Second-order (biquad) low-pass and high-pass filters.
pub mod filter;
/// Render context and the parameter trait shared by all stages.
pub mod node;
/// Phase-accumulating oscillator with four waveforms.
pub mod oscillator;
/// Single feedback line reverb.
pub mod reverb;

pub use node::{Parameterized, RenderCtx};
