use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::node::{flag, from_flag, Parameterized};

/*
Biquad Filter
=============

A single second-order recursive (IIR) section. Two instances sit in series
in the engine: a low-pass followed by a high-pass.

Difference Equation
-------------------

    y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]

Coefficients (bilinear transform of the analog prototype)
---------------------------------------------------------

    w     = TAU * cutoff / sample_rate
    alpha = sin(w) / (2 * resonance)

                 low-pass          high-pass
    b0           (1 - cos w) / 2   (1 + cos w) / 2
    b1            1 - cos w       -(1 + cos w)
    b2           (1 - cos w) / 2   (1 + cos w) / 2

    a0 = 1 + alpha,  a1 = -2 cos w,  a2 = 1 - alpha

All coefficients are divided by a0 so a[0] is 1.

Coefficients are NOT updated when cutoff or resonance change. Call
`calculate_coefficients` after editing either one; the engine does this for
every filter parameter update it applies.

Cutoff is clamped below 0.45 * sample_rate before computing, keeping w away
from PI where the section degenerates.
*/

pub const MIN_CUTOFF: f32 = 20.0;
/// Highest cutoff as a fraction of the sample rate.
pub const MAX_CUTOFF_RATIO: f32 = 0.45;
pub const MIN_RESONANCE: f32 = 0.1;
pub const MAX_RESONANCE: f32 = 20.0;

const HISTORY_LEN: usize = 3;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
}

impl FilterKind {
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::LowPass => "Low-pass",
            FilterKind::HighPass => "High-pass",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterParam {
    Enabled,
    Cutoff,
    Resonance,
}

/// Normalized biquad coefficients (`a[0]` is always 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub b: [f32; 3],
    pub a: [f32; 3],
}

impl Coefficients {
    /// Passes the input straight through.
    pub const IDENTITY: Self = Self {
        b: [1.0, 0.0, 0.0],
        a: [1.0, 0.0, 0.0],
    };

    /// Compute coefficients for `kind` at `cutoff` Hz with Q `resonance`.
    pub fn compute(kind: FilterKind, cutoff: f32, resonance: f32, sample_rate: f32) -> Self {
        let cutoff = clamp_cutoff(cutoff, sample_rate);
        let resonance = clamp_resonance(resonance);

        let w = TAU * cutoff / sample_rate;
        let (sin_w, cos_w) = w.sin_cos();
        let alpha = sin_w / (2.0 * resonance);

        let (b0, b1, b2) = match kind {
            FilterKind::LowPass => {
                let k = 1.0 - cos_w;
                (k * 0.5, k, k * 0.5)
            }
            FilterKind::HighPass => {
                let k = 1.0 + cos_w;
                (k * 0.5, -k, k * 0.5)
            }
        };

        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w;
        let a2 = 1.0 - alpha;

        Self {
            b: [b0 / a0, b1 / a0, b2 / a0],
            a: [1.0, a1 / a0, a2 / a0],
        }
    }

    /// DC gain, `H(z)` at `z = 1`.
    pub fn dc_gain(&self) -> f32 {
        (self.b[0] + self.b[1] + self.b[2]) / (self.a[0] + self.a[1] + self.a[2])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterSnapshot {
    pub cutoff: f32,
    pub resonance: f32,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Biquad {
    kind: FilterKind,
    cutoff: f32,
    resonance: f32,
    enabled: bool,
    coefficients: Coefficients,
    x: [f32; HISTORY_LEN], // x[0] newest input
    y: [f32; HISTORY_LEN], // y[0] newest output
}

impl Biquad {
    pub fn new(kind: FilterKind, cutoff: f32, resonance: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            kind,
            cutoff: cutoff.max(MIN_CUTOFF),
            resonance: clamp_resonance(resonance),
            enabled: true,
            coefficients: Coefficients::IDENTITY,
            x: [0.0; HISTORY_LEN],
            y: [0.0; HISTORY_LEN],
        };
        filter.calculate_coefficients(sample_rate);
        filter
    }

    pub fn lowpass(cutoff: f32, sample_rate: f32) -> Self {
        Self::new(FilterKind::LowPass, cutoff, 0.707, sample_rate)
    }

    pub fn highpass(cutoff: f32, sample_rate: f32) -> Self {
        Self::new(FilterKind::HighPass, cutoff, 0.707, sample_rate)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Recompute coefficients from the current cutoff and resonance.
    ///
    /// The stored cutoff is clamped to the safe range for `sample_rate` too,
    /// so snapshots show the value actually in effect.
    pub fn calculate_coefficients(&mut self, sample_rate: f32) {
        self.cutoff = clamp_cutoff(self.cutoff, sample_rate);
        self.coefficients =
            Coefficients::compute(self.kind, self.cutoff, self.resonance, sample_rate);
    }

    /// Filter one sample in place. Leaves `sample` untouched when disabled.
    pub fn apply_filter(&mut self, sample: &mut f32) {
        if !self.enabled {
            return;
        }

        self.x.copy_within(0..HISTORY_LEN - 1, 1);
        self.y.copy_within(0..HISTORY_LEN - 1, 1);
        self.x[0] = *sample;

        let Coefficients { b, a } = self.coefficients;
        let y0 = b[0] * self.x[0] + b[1] * self.x[1] + b[2] * self.x[2]
            - a[1] * self.y[1]
            - a[2] * self.y[2];

        self.y[0] = y0;
        *sample = y0;
    }

    pub fn process(&mut self, sample: f32) -> f32 {
        let mut out = sample;
        self.apply_filter(&mut out);
        out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            self.apply_filter(sample);
        }
    }

    pub fn reset(&mut self) {
        self.x = [0.0; HISTORY_LEN];
        self.y = [0.0; HISTORY_LEN];
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Coefficients are left stale until `calculate_coefficients`.
    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff = if cutoff.is_nan() { MIN_CUTOFF } else { cutoff.max(MIN_CUTOFF) };
    }

    /// Coefficients are left stale until `calculate_coefficients`.
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = clamp_resonance(resonance);
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            cutoff: self.cutoff,
            resonance: self.resonance,
            enabled: self.enabled,
        }
    }
}

impl Parameterized for Biquad {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Enabled => from_flag(self.enabled),
            FilterParam::Cutoff => self.cutoff,
            FilterParam::Resonance => self.resonance,
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32) {
        match param {
            FilterParam::Enabled => self.enabled = flag(value),
            FilterParam::Cutoff => self.set_cutoff(value),
            FilterParam::Resonance => self.set_resonance(value),
        }
    }
}

/// Clamp `cutoff` into [MIN_CUTOFF, 0.45 * sample_rate].
pub fn clamp_cutoff(cutoff: f32, sample_rate: f32) -> f32 {
    let max = (sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF);
    if cutoff.is_nan() {
        return max;
    }
    cutoff.clamp(MIN_CUTOFF, max)
}

fn clamp_resonance(resonance: f32) -> f32 {
    if resonance.is_nan() {
        return MIN_RESONANCE;
    }
    resonance.clamp(MIN_RESONANCE, MAX_RESONANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{node::RenderCtx, oscillator::Oscillator};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::new(SAMPLE_RATE, 0.0)
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn sine_block(freq: f32, len: usize) -> Vec<f32> {
        let mut osc = Oscillator::new(freq);
        (0..len).map(|_| osc.generate_wave(&ctx())).collect()
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = Biquad::lowpass(500.0, SAMPLE_RATE);
        let mut buffer = vec![1.0; 2048];
        filter.render(&mut buffer);
        assert!((buffer[2047] - 1.0).abs() < 1e-3, "got {}", buffer[2047]);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut filter = Biquad::highpass(500.0, SAMPLE_RATE);
        let mut buffer = vec![1.0; 2048];
        filter.render(&mut buffer);
        assert!(buffer[2047].abs() < 1e-3, "got {}", buffer[2047]);
    }

    #[test]
    fn lowpass_attenuates_high_frequency() {
        let mut filter = Biquad::lowpass(500.0, SAMPLE_RATE);
        let mut buffer = sine_block(8_000.0, 2048);
        filter.render(&mut buffer);
        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.05, "expected attenuation, got peak {peak}");
    }

    #[test]
    fn highpass_attenuates_low_frequency() {
        let mut filter = Biquad::highpass(5_000.0, SAMPLE_RATE);
        let mut buffer = sine_block(100.0, 4096);
        filter.render(&mut buffer);
        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.05, "expected attenuation, got peak {peak}");
    }

    #[test]
    fn disabled_filter_is_bit_exact_identity() {
        let mut filter = Biquad::lowpass(200.0, SAMPLE_RATE).with_enabled(false);
        for x in [0.0f32, -0.0, 0.123_456_7, -1.5, f32::MAX, f32::MIN_POSITIVE, f32::NAN] {
            let mut sample = x;
            filter.apply_filter(&mut sample);
            assert_eq!(sample.to_bits(), x.to_bits());
        }
    }

    #[test]
    fn coefficients_stay_stale_until_recomputed() {
        let mut filter = Biquad::lowpass(1_000.0, SAMPLE_RATE);
        let before = filter.coefficients();

        filter.set_cutoff(4_000.0);
        filter.set_resonance(2.0);
        assert_eq!(filter.coefficients(), before);

        filter.calculate_coefficients(SAMPLE_RATE);
        assert_eq!(
            filter.coefficients(),
            Coefficients::compute(FilterKind::LowPass, 4_000.0, 2.0, SAMPLE_RATE)
        );
    }

    #[test]
    fn cutoff_above_nyquist_is_clamped() {
        let mut filter = Biquad::lowpass(1_000.0, SAMPLE_RATE);
        filter.set_cutoff(100_000.0);
        filter.calculate_coefficients(SAMPLE_RATE);
        assert_eq!(filter.cutoff(), SAMPLE_RATE * MAX_CUTOFF_RATIO);

        let c = filter.coefficients();
        assert!(c.b.iter().chain(c.a.iter()).all(|v| v.is_finite()));

        let mut buffer = sine_block(1_000.0, 1024);
        filter.render(&mut buffer);
        assert!(buffer.iter().all(|s| s.is_finite() && s.abs() < 2.0));
    }

    #[test]
    fn resonance_is_floored() {
        let c = Coefficients::compute(FilterKind::HighPass, 1_000.0, 0.0, SAMPLE_RATE);
        assert!(c.b.iter().chain(c.a.iter()).all(|v| v.is_finite()));
    }

    #[test]
    fn unity_dc_gain_for_lowpass_design() {
        let c = Coefficients::compute(FilterKind::LowPass, 2_000.0, 0.707, SAMPLE_RATE);
        assert!((c.dc_gain() - 1.0).abs() < 1e-4);
        let c = Coefficients::compute(FilterKind::HighPass, 2_000.0, 0.707, SAMPLE_RATE);
        assert!(c.dc_gain().abs() < 1e-4);
    }

    #[test]
    fn toggling_twice_restores_filtering() {
        let mut a = Biquad::lowpass(800.0, SAMPLE_RATE);
        let mut b = Biquad::lowpass(800.0, SAMPLE_RATE);
        b.set_param(FilterParam::Enabled, 0.0);
        b.set_param(FilterParam::Enabled, 1.0);

        for x in sine_block(2_000.0, 256) {
            assert_eq!(a.process(x), b.process(x));
        }
    }
}
