pub mod config;
pub mod dsp; // Oscillators, envelope, filters, effects
pub mod error;
pub mod io;
pub mod synth; // Engine aggregate, parameters, messages

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use synth::engine::Engine;

pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
pub const MAX_BLOCK_SIZE: usize = 2048;
/// Upper bound on the oscillator bank; snapshots are sized by it.
pub const MAX_OSCILLATORS: usize = 8;
/// Longest reverb/delay line: 2 seconds at 48kHz.
pub const MAX_DELAY_SAMPLES: usize = 96_000;
/// Largest chorus excursion into the delay buffer, in samples.
pub const MAX_CHORUS_DEPTH: f32 = 2_000.0;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
