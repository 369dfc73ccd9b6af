//! The effect chain: reverb, then delay, then chorus.
//!
//! Each effect is gated by its own enabled flag. The chorus taps the delay
//! line's buffer, so it keeps sweeping over whatever the delay last held even
//! while the delay itself is bypassed.

use crate::dsp::{
    chorus::{Chorus, ChorusParam, ChorusSnapshot},
    delay::{Delay, DelayParam, DelaySnapshot},
    node::{Parameterized, RenderCtx},
    reverb::{Reverb, ReverbParam, ReverbSnapshot},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectParam {
    Reverb(ReverbParam),
    Delay(DelayParam),
    Chorus(ChorusParam),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectsSnapshot {
    pub reverb: ReverbSnapshot,
    pub delay: DelaySnapshot,
    pub chorus: ChorusSnapshot,
}

#[derive(Debug, Clone)]
pub struct EffectProcessor {
    pub reverb: Reverb,
    pub delay: Delay,
    pub chorus: Chorus,
}

impl EffectProcessor {
    pub fn new(reverb: Reverb, delay: Delay, chorus: Chorus) -> Self {
        Self {
            reverb,
            delay,
            chorus,
        }
    }

    pub fn process(&mut self, sample: f32, ctx: &RenderCtx) -> f32 {
        let sample = self.reverb.process(sample);
        let sample = self.delay.process(sample);
        self.chorus.process(sample, self.delay.buffer(), ctx)
    }

    pub fn reset(&mut self) {
        self.reverb.reset();
        self.delay.reset();
        self.chorus.reset();
    }

    pub fn snapshot(&self) -> EffectsSnapshot {
        EffectsSnapshot {
            reverb: self.reverb.snapshot(),
            delay: self.delay.snapshot(),
            chorus: self.chorus.snapshot(),
        }
    }
}

impl Default for EffectProcessor {
    /// All three effects bypassed: 100ms reverb, 250ms delay, 5ms chorus at 48kHz.
    fn default() -> Self {
        Self::new(
            Reverb::new(4_800, 0.5).with_enabled(false),
            Delay::new(12_000, 0.4).with_enabled(false),
            Chorus::new(240.0, 1.5).with_enabled(false),
        )
    }
}

impl Parameterized for EffectProcessor {
    type Param = EffectParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            EffectParam::Reverb(p) => self.reverb.get_param(p),
            EffectParam::Delay(p) => self.delay.get_param(p),
            EffectParam::Chorus(p) => self.chorus.get_param(p),
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32) {
        match param {
            EffectParam::Reverb(p) => self.reverb.set_param(p, value),
            EffectParam::Delay(p) => self.delay.set_param(p, value),
            EffectParam::Chorus(p) => self.chorus.set_param(p, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderCtx {
        RenderCtx::new(48_000.0, 0.0)
    }

    #[test]
    fn all_bypassed_is_identity() {
        let mut fx = EffectProcessor::default();
        for x in [0.0f32, 0.5, -0.33, 1.0] {
            assert_eq!(fx.process(x, &ctx()).to_bits(), x.to_bits());
        }
    }

    #[test]
    fn reverb_feeds_delay() {
        let mut fx = EffectProcessor::new(
            Reverb::new(500, 0.5),
            Delay::new(500, 0.5),
            Chorus::new(10.0, 1.0).with_enabled(false),
        );
        // reverb: 1.0 -> 0.5, delay: 0.5 -> 0.25
        assert_eq!(fx.process(1.0, &ctx()), 0.25);
        assert_eq!(fx.delay.buffer().back().copied(), Some(0.5));
    }

    #[test]
    fn chorus_reads_delay_buffer_while_delay_bypassed() {
        let mut fx = EffectProcessor::new(
            Reverb::new(10, 0.5).with_enabled(false),
            Delay::new(4, 0.5),
            Chorus::new(0.0, 1.0),
        );
        fx.delay.set_enabled(false);
        // delay buffer is four zeros; chorus adds the newest one
        assert_eq!(fx.process(0.75, &ctx()), 0.75);

        fx.delay.set_enabled(true);
        fx.process(1.0, &ctx());
        fx.delay.set_enabled(false);
        // newest delay sample is now 1.0
        assert_eq!(fx.process(0.0, &ctx()), 1.0);
    }

    #[test]
    fn params_route_to_each_effect() {
        let mut fx = EffectProcessor::default();
        fx.set_param(EffectParam::Reverb(ReverbParam::Decay), 0.8);
        fx.set_param(EffectParam::Delay(DelayParam::Feedback), 0.95);
        fx.set_param(EffectParam::Chorus(ChorusParam::Rate), 3.0);

        assert_eq!(fx.reverb.decay(), 0.8);
        assert_eq!(fx.delay.feedback(), 0.9);
        assert_eq!(fx.get_param(EffectParam::Chorus(ChorusParam::Rate)), 3.0);
    }
}
