//! Compiled-in defaults and optional TOML overrides for the engine.
//!
//! Every section is optional in the file; missing keys keep their defaults.
//! Values are clamped when the engine is built, so a config can never put a
//! stage into an invalid state.
//!
//! ```toml
//! sample_rate = 44100.0
//!
//! [envelope]
//! attack = 0.02
//! release = 0.5
//!
//! [[oscillators]]
//! frequency = 1046.50
//! wave = "square"
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use std::path::Path;

#[cfg(feature = "serde")]
use tracing::info;

use crate::{
    dsp::{filter::FilterKind, oscillator::Waveform},
    error::{Error, Result},
    DEFAULT_SAMPLE_RATE, MAX_OSCILLATORS,
};

pub const DEFAULT_LOW_PASS_CUTOFF: f32 = 5_000.0;
pub const DEFAULT_HIGH_PASS_CUTOFF: f32 = 60.0;

/// Pitches of the seven keys, C6 through B6.
pub const KEY_PITCHES: [f32; 7] = [1046.50, 1174.66, 1318.51, 1396.91, 1567.98, 1760.00, 1975.53];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub oscillators: Vec<OscillatorConfig>,
    pub envelope: EnvelopeConfig,
    pub low_pass: FilterConfig,
    pub high_pass: FilterConfig,
    pub reverb: ReverbConfig,
    pub delay: DelayConfig,
    pub chorus: ChorusConfig,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorConfig {
    pub frequency: f32,
    pub amplitude: f32,
    pub wave: Waveform,
    pub octave_shift: i32,
    pub enabled: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub enabled: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Hz; when unset, 5kHz for the low-pass and 60Hz for the high-pass
    pub cutoff: Option<f32>,
    pub resonance: f32,
    pub enabled: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReverbConfig {
    pub decay: f32,
    /// Line length in samples
    pub length: usize,
    pub enabled: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct DelayConfig {
    pub feedback: f32,
    /// Delay length in samples
    pub length: usize,
    pub enabled: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChorusConfig {
    /// Sweep depth in samples
    pub depth: f32,
    /// LFO rate in Hz
    pub rate: f32,
    pub enabled: bool,
}

impl EngineConfig {
    /// A bank holding a single oscillator with every other stage bypassed.
    pub fn single(oscillator: OscillatorConfig) -> Self {
        Self {
            oscillators: vec![oscillator],
            envelope: EnvelopeConfig {
                enabled: false,
                ..Default::default()
            },
            low_pass: FilterConfig::bypassed(),
            high_pass: FilterConfig::bypassed(),
            ..Default::default()
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn filter(&self, kind: FilterKind) -> &FilterConfig {
        match kind {
            FilterKind::LowPass => &self.low_pass,
            FilterKind::HighPass => &self.high_pass,
        }
    }

    /// Reject configurations the engine cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.oscillators.is_empty() {
            return Err(Error::EmptyBank);
        }
        if self.oscillators.len() > MAX_OSCILLATORS {
            return Err(Error::TooManyOscillators(self.oscillators.len()));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        info!(
            path = %path.display(),
            oscillators = config.oscillators.len(),
            "loaded engine config"
        );
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            oscillators: KEY_PITCHES.iter().map(|&f| OscillatorConfig::at(f)).collect(),
            envelope: EnvelopeConfig::default(),
            low_pass: FilterConfig::default(),
            high_pass: FilterConfig::default(),
            reverb: ReverbConfig::default(),
            delay: DelayConfig::default(),
            chorus: ChorusConfig::default(),
        }
    }
}

impl OscillatorConfig {
    pub fn at(frequency: f32) -> Self {
        Self {
            frequency,
            ..Default::default()
        }
    }
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            frequency: KEY_PITCHES[0],
            amplitude: 1.0,
            wave: Waveform::Sine,
            octave_shift: 0,
            enabled: true,
        }
    }
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
            enabled: true,
        }
    }
}

impl FilterConfig {
    pub fn bypassed() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn cutoff_for(&self, kind: FilterKind) -> f32 {
        self.cutoff.unwrap_or(match kind {
            FilterKind::LowPass => DEFAULT_LOW_PASS_CUTOFF,
            FilterKind::HighPass => DEFAULT_HIGH_PASS_CUTOFF,
        })
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff: None,
            resonance: 0.707,
            enabled: true,
        }
    }
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            decay: 0.5,
            length: 4_800,
            enabled: false,
        }
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            feedback: 0.4,
            length: 12_000,
            enabled: false,
        }
    }
}

impl Default for ChorusConfig {
    fn default() -> Self {
        Self {
            depth: 240.0,
            rate: 1.5,
            enabled: false,
        }
    }
}
