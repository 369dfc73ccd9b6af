use std::collections::VecDeque;
use std::f32::consts::TAU;

use crate::{
    dsp::node::{flag, from_flag, Parameterized, RenderCtx},
    MAX_CHORUS_DEPTH,
};

/*
Chorus
======

The chorus has no buffer of its own. It reads the delay effect's history at
an offset swept by a sine LFO and adds that sample on top of the input:

    lfo     = 0.5 + 0.5 * sin(TAU * rate * phase / sample_rate)   (0.0 - 1.0)
    offset  = depth * lfo                                          (samples)
    output  = input + buffer[len - offset]

There is no dry/wet crossfade; the tap is summed straight in. `phase` counts
processed samples and wraps at the sample rate.

Depth is in samples, measured back from the newest sample in the delay
buffer. Offsets below one sample read the newest sample; offsets past the
start of the buffer read the oldest.

Parameters
----------

Rate (0 - 20 Hz):   LFO speed. 0.5-2 Hz is a classic shimmer.
Depth (samples):    Sweep width. 5ms at 48kHz is 240 samples.
*/

pub const MAX_RATE: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChorusParam {
    Enabled,
    /// Sweep depth in samples
    Depth,
    /// LFO rate in Hz
    Rate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChorusSnapshot {
    pub depth: f32,
    pub rate: f32,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Chorus {
    depth: f32,
    rate: f32,
    phase: f32,
    enabled: bool,
}

impl Chorus {
    pub fn new(depth: f32, rate: f32) -> Self {
        Self {
            depth: clamp_depth(depth),
            rate: clamp_rate(rate),
            phase: 0.0,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Current sweep offset into the delay buffer, in samples.
    pub fn modulation_offset(&self, ctx: &RenderCtx) -> f32 {
        let lfo = 0.5 + 0.5 * (TAU * self.rate * self.phase / ctx.sample_rate).sin();
        self.depth * lfo
    }

    /// Add the swept tap from `delay_buffer` to `input`.
    pub fn process(&mut self, input: f32, delay_buffer: &VecDeque<f32>, ctx: &RenderCtx) -> f32 {
        if !self.enabled {
            return input;
        }

        let offset = self.modulation_offset(ctx);
        let len = delay_buffer.len();
        let delayed = if len == 0 {
            0.0
        } else {
            let back = (offset as usize).clamp(1, len);
            delay_buffer[len - back]
        };

        self.phase += 1.0;
        if self.phase >= ctx.sample_rate {
            self.phase -= ctx.sample_rate;
        }

        input + delayed
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = clamp_depth(depth);
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = clamp_rate(rate);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn snapshot(&self) -> ChorusSnapshot {
        ChorusSnapshot {
            depth: self.depth,
            rate: self.rate,
            enabled: self.enabled,
        }
    }
}

impl Parameterized for Chorus {
    type Param = ChorusParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            ChorusParam::Enabled => from_flag(self.enabled),
            ChorusParam::Depth => self.depth,
            ChorusParam::Rate => self.rate,
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32) {
        match param {
            ChorusParam::Enabled => self.enabled = flag(value),
            ChorusParam::Depth => self.set_depth(value),
            ChorusParam::Rate => self.set_rate(value),
        }
    }
}

fn clamp_depth(depth: f32) -> f32 {
    if depth.is_nan() {
        return 0.0;
    }
    depth.clamp(0.0, MAX_CHORUS_DEPTH)
}

fn clamp_rate(rate: f32) -> f32 {
    if rate.is_nan() {
        return 0.0;
    }
    rate.clamp(0.0, MAX_RATE)
}
