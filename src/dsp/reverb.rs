//! Reverb - a single feedback line
//!
//! The buffer holds exactly `delay_length` samples. Each call reads the
//! oldest one, appends the input plus the decayed tap, and drops the oldest:
//!
//! ```text
//! delayed = buffer[len - delay_length]
//! push      input + decay * delayed
//! output  = input * (1 - decay) + delayed * decay
//! ```
//!
//! Changing the length resizes the buffer immediately (zero-padding at the
//! front, or dropping the oldest samples), so the read index is always in
//! bounds. Capacity for the longest line is reserved at construction.

use std::collections::VecDeque;

use tracing::debug;

use crate::{
    dsp::{
        delay::{clamp_length, length_from_value, resize_front},
        node::{flag, from_flag, Parameterized},
    },
    MAX_DELAY_SAMPLES,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReverbParam {
    Enabled,
    /// Wet amount and feedback, 0.0 - 1.0
    Decay,
    /// Line length in samples
    Length,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReverbSnapshot {
    pub decay: f32,
    pub delay_length: usize,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Reverb {
    buffer: VecDeque<f32>,
    delay_length: usize,
    decay: f32,
    enabled: bool,
}

impl Reverb {
    pub fn new(delay_length: usize, decay: f32) -> Self {
        let delay_length = clamp_length(delay_length);
        let mut buffer = VecDeque::with_capacity(MAX_DELAY_SAMPLES + 1);
        buffer.resize(delay_length, 0.0);

        Self {
            buffer,
            delay_length,
            decay: clamp_decay(decay),
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn process(&mut self, input: f32) -> f32 {
        if !self.enabled {
            return input;
        }

        let index = self.buffer.len().saturating_sub(self.delay_length);
        let delayed = self.buffer[index];

        self.buffer.push_back(input + self.decay * delayed);
        self.buffer.pop_front();

        input * (1.0 - self.decay) + delayed * self.decay
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn set_delay_length(&mut self, delay_length: usize) {
        let delay_length = clamp_length(delay_length);
        if delay_length == self.delay_length {
            return;
        }

        debug!(
            from = self.delay_length,
            to = delay_length,
            "reverb buffer resized"
        );
        self.delay_length = delay_length;
        resize_front(&mut self.buffer, delay_length);
    }

    pub fn set_decay(&mut self, decay: f32) {
        self.decay = clamp_decay(decay);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn delay_length(&self) -> usize {
        self.delay_length
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn buffer(&self) -> &VecDeque<f32> {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.iter_mut().for_each(|s| *s = 0.0);
    }

    pub fn snapshot(&self) -> ReverbSnapshot {
        ReverbSnapshot {
            decay: self.decay,
            delay_length: self.delay_length,
            enabled: self.enabled,
        }
    }
}

impl Parameterized for Reverb {
    type Param = ReverbParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            ReverbParam::Enabled => from_flag(self.enabled),
            ReverbParam::Decay => self.decay,
            ReverbParam::Length => self.delay_length as f32,
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32) {
        match param {
            ReverbParam::Enabled => self.enabled = flag(value),
            ReverbParam::Decay => self.set_decay(value),
            ReverbParam::Length => self.set_delay_length(length_from_value(value)),
        }
    }
}

fn clamp_decay(decay: f32) -> f32 {
    if decay.is_nan() {
        return 0.0;
    }
    decay.clamp(0.0, 1.0)
}
