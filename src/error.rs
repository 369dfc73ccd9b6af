use crate::MAX_OSCILLATORS;

/// Errors raised while building or driving the engine.
///
/// Out-of-range parameter values are never errors; they are clamped where
/// they are applied.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("oscillator {index} does not exist (bank has {len})")]
    UnknownOscillator { index: usize, len: usize },

    #[error("trigger source {0} is out of range (max {max})", max = crate::synth::engine::MAX_TRIGGER_SOURCES - 1)]
    UnknownSource(usize),

    #[error("oscillator bank holds at most {max} oscillators, got {0}", max = MAX_OSCILLATORS)]
    TooManyOscillators(usize),

    #[error("oscillator bank is empty")]
    EmptyBank,

    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    #[cfg(feature = "serde")]
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
