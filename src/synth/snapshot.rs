//! Read-only state for display.
//!
//! Snapshots are `Copy` and allocation-free so the audio thread can push
//! them through a ring buffer every block.

use crate::{
    dsp::{
        effects::EffectsSnapshot,
        envelope::EnvelopeSnapshot,
        filter::{FilterKind, FilterSnapshot},
        oscillator::OscillatorSnapshot,
    },
    synth::engine::MAX_TRIGGER_SOURCES,
    MAX_OSCILLATORS,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineSnapshot {
    pub sample_rate: f32,
    /// Engine clock in seconds
    pub time: f64,
    pub oscillators: [OscillatorSnapshot; MAX_OSCILLATORS],
    pub num_oscillators: u8,
    pub envelope: EnvelopeSnapshot,
    pub low_pass: FilterSnapshot,
    pub high_pass: FilterSnapshot,
    pub effects: EffectsSnapshot,
    /// Bit n set while trigger source n is held
    pub held_sources: u32,
    pub last_output: u8,
}

impl EngineSnapshot {
    pub fn oscillators(&self) -> &[OscillatorSnapshot] {
        &self.oscillators[..self.num_oscillators as usize]
    }

    pub fn filter(&self, kind: FilterKind) -> &FilterSnapshot {
        match kind {
            FilterKind::LowPass => &self.low_pass,
            FilterKind::HighPass => &self.high_pass,
        }
    }

    pub fn is_held(&self, source: usize) -> bool {
        source < MAX_TRIGGER_SOURCES && self.held_sources & (1u32 << source) != 0
    }
}
