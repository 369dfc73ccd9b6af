use std::f32::consts::{FRAC_2_PI, PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::node::{flag, from_flag, Parameterized, RenderCtx};

/*
Oscillator Bank Voice
=====================

Each key of the instrument owns one oscillator tuned to a fixed pitch. The
oscillator keeps a phase accumulator in radians and computes its waveform
directly from that phase every sample.

Phase Accumulation
------------------

    phase += TAU * frequency / sample_rate
    phase  = phase mod TAU          (always in [0, TAU))

At 1046.5 Hz and 48kHz that is ~0.137 rad per sample, so one cycle takes
~45.9 samples.

Waveforms
---------

    Sine      sin(phase)
    Square    +1 while sin(phase) >= 0, else -1
    Triangle  asin(sin(phase)) * 2/PI
    Sawtooth  (phase - PI) * 2/PI

Sawtooth is a linear ramp over the phase and is not rescaled to [-1, 1]:
it spans [-2, 2) across a cycle. The other three stay within [-1, 1].

No band-limiting is applied; high pitches alias.

Octave Shift
------------

    frequency = base_frequency * 2^octave_shift,  octave_shift in [-4, 3]
*/

pub const MIN_OCTAVE_SHIFT: i32 = -4;
pub const MAX_OCTAVE_SHIFT: i32 = 3;
pub const MIN_FREQUENCY: f32 = 20.0;
pub const MAX_FREQUENCY: f32 = 20_000.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
    ];

    /// The waveform after this one, wrapping Sawtooth back to Sine.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn index(self) -> usize {
        match self {
            Waveform::Sine => 0,
            Waveform::Square => 1,
            Waveform::Triangle => 2,
            Waveform::Sawtooth => 3,
        }
    }

    /// Wraps out-of-range indices.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Square => "Square",
            Waveform::Triangle => "Triangle",
            Waveform::Sawtooth => "Sawtooth",
        }
    }

    /// Evaluate the waveform at `phase` (radians, expected in [0, TAU)).
    #[inline]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => phase.sin().asin() * FRAC_2_PI,
            Waveform::Sawtooth => FRAC_2_PI * (phase - PI),
        }
    }
}

/// Parameters a controller can edit on an oscillator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OscParam {
    Enabled,
    /// Base frequency in Hz, before octave shift
    Frequency,
    Amplitude,
    /// Waveform index, see [`Waveform::index`]
    WaveType,
    OctaveShift,
}

/// Read-only view of an oscillator for display
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OscillatorSnapshot {
    pub base_frequency: f32,
    pub frequency: f32,
    pub amplitude: f32,
    pub wave: Waveform,
    pub octave_shift: i32,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    base_frequency: f32,
    amplitude: f32,
    wave: Waveform,
    phase: f32,
    enabled: bool,
    octave_shift: i32,
}

impl Oscillator {
    pub fn new(base_frequency: f32) -> Self {
        Self {
            base_frequency: base_frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY),
            amplitude: 1.0,
            wave: Waveform::Sine,
            phase: 0.0,
            enabled: true,
            octave_shift: 0,
        }
    }

    pub fn with_wave(mut self, wave: Waveform) -> Self {
        self.wave = wave;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self
    }

    pub fn with_octave_shift(mut self, shift: i32) -> Self {
        self.octave_shift = shift.clamp(MIN_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Effective frequency: base frequency shifted by whole octaves.
    pub fn frequency(&self) -> f32 {
        self.base_frequency * 2.0_f32.powi(self.octave_shift)
    }

    /// Advance the phase by one sample and return the scaled waveform value.
    ///
    /// A disabled oscillator returns 0 and keeps its phase.
    pub fn generate_wave(&mut self, ctx: &RenderCtx) -> f32 {
        if !self.enabled {
            return 0.0;
        }

        self.phase += TAU * self.frequency() / ctx.sample_rate;
        self.phase %= TAU;

        self.wave.evaluate(self.phase) * self.amplitude
    }

    pub fn next_wave_type(&mut self) {
        self.wave = self.wave.next();
    }

    /// Shift by `delta` octaves, clamped to [-4, 3].
    pub fn update_octave_shift(&mut self, delta: i32) {
        self.octave_shift = self
            .octave_shift
            .saturating_add(delta)
            .clamp(MIN_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn wave(&self) -> Waveform {
        self.wave
    }

    pub fn octave_shift(&self) -> i32 {
        self.octave_shift
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn snapshot(&self) -> OscillatorSnapshot {
        OscillatorSnapshot {
            base_frequency: self.base_frequency,
            frequency: self.frequency(),
            amplitude: self.amplitude,
            wave: self.wave,
            octave_shift: self.octave_shift,
            enabled: self.enabled,
        }
    }
}

impl Parameterized for Oscillator {
    type Param = OscParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            OscParam::Enabled => from_flag(self.enabled),
            OscParam::Frequency => self.base_frequency,
            OscParam::Amplitude => self.amplitude,
            OscParam::WaveType => self.wave.index() as f32,
            OscParam::OctaveShift => self.octave_shift as f32,
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32) {
        match param {
            OscParam::Enabled => self.enabled = flag(value),
            OscParam::Frequency => {
                self.base_frequency = value.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
            }
            OscParam::Amplitude => self.amplitude = value.clamp(0.0, 1.0),
            OscParam::WaveType => {
                self.wave = Waveform::from_index(value.round().max(0.0) as usize);
            }
            OscParam::OctaveShift => {
                let shift = value.round().clamp(MIN_OCTAVE_SHIFT as f32, MAX_OCTAVE_SHIFT as f32);
                self.octave_shift = shift as i32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::new(SAMPLE_RATE, 0.0)
    }

    #[test]
    fn phase_stays_in_range() {
        for wave in Waveform::ALL {
            let mut osc = Oscillator::new(1975.53).with_wave(wave).with_octave_shift(3);
            for _ in 0..10_000 {
                osc.generate_wave(&ctx());
                assert!((0.0..TAU).contains(&osc.phase()), "phase {}", osc.phase());
            }
        }
    }

    #[test]
    fn sine_follows_own_phase() {
        let mut osc = Oscillator::new(1046.5);
        for _ in 0..64 {
            let out = osc.generate_wave(&ctx());
            assert_eq!(out, osc.phase().sin());
        }
    }

    #[test]
    fn first_sample_advances_phase_once() {
        let mut osc = Oscillator::new(1000.0);
        osc.generate_wave(&ctx());
        let expected = TAU * 1000.0 / SAMPLE_RATE;
        assert!((osc.phase() - expected).abs() < 1e-6);
    }

    #[test]
    fn disabled_oscillator_is_silent_and_frozen() {
        let mut osc = Oscillator::new(440.0);
        osc.generate_wave(&ctx());
        let phase = osc.phase();

        osc.set_enabled(false);
        for _ in 0..16 {
            assert_eq!(osc.generate_wave(&ctx()), 0.0);
        }
        assert_eq!(osc.phase(), phase);
    }

    #[test]
    fn square_and_triangle_are_bounded() {
        for wave in [Waveform::Square, Waveform::Triangle] {
            let mut osc = Oscillator::new(523.25).with_wave(wave);
            for _ in 0..2_000 {
                let s = osc.generate_wave(&ctx());
                assert!(s.abs() <= 1.0 + 1e-6, "{wave:?} produced {s}");
            }
        }
    }

    #[test]
    fn square_is_bipolar_unit() {
        let mut osc = Oscillator::new(440.0).with_wave(Waveform::Square);
        for _ in 0..500 {
            let s = osc.generate_wave(&ctx());
            assert!(s == 1.0 || s == -1.0);
        }
    }

    #[test]
    fn sawtooth_is_unnormalized_ramp() {
        assert_eq!(Waveform::Sawtooth.evaluate(0.0), -2.0);
        assert_eq!(Waveform::Sawtooth.evaluate(PI), 0.0);
        assert!(Waveform::Sawtooth.evaluate(TAU - 1e-3) > 1.99);
    }

    #[test]
    fn amplitude_scales_output() {
        let mut full = Oscillator::new(440.0);
        let mut half = Oscillator::new(440.0).with_amplitude(0.5);
        for _ in 0..32 {
            let a = full.generate_wave(&ctx());
            let b = half.generate_wave(&ctx());
            assert!((a * 0.5 - b).abs() < 1e-6);
        }
    }

    #[test]
    fn wave_type_cycles_in_order() {
        let mut osc = Oscillator::new(440.0);
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(osc.wave());
            osc.next_wave_type();
        }
        assert_eq!(
            seen,
            vec![
                Waveform::Sine,
                Waveform::Square,
                Waveform::Triangle,
                Waveform::Sawtooth,
                Waveform::Sine
            ]
        );
    }

    #[test]
    fn octave_shift_clamps() {
        let mut osc = Oscillator::new(1000.0);
        osc.update_octave_shift(10);
        assert_eq!(osc.octave_shift(), MAX_OCTAVE_SHIFT);
        assert_eq!(osc.frequency(), 8000.0);

        osc.update_octave_shift(-100);
        assert_eq!(osc.octave_shift(), MIN_OCTAVE_SHIFT);
        assert_eq!(osc.frequency(), 62.5);

        osc.update_octave_shift(i32::MAX);
        assert_eq!(osc.octave_shift(), MAX_OCTAVE_SHIFT);
    }

    #[test]
    fn set_param_clamps() {
        let mut osc = Oscillator::new(440.0);
        osc.set_param(OscParam::Amplitude, 3.0);
        assert_eq!(osc.get_param(OscParam::Amplitude), 1.0);

        osc.set_param(OscParam::OctaveShift, -9.0);
        assert_eq!(osc.get_param(OscParam::OctaveShift), -4.0);

        osc.set_param(OscParam::WaveType, 6.0);
        assert_eq!(osc.wave(), Waveform::Triangle);

        osc.set_param(OscParam::Enabled, 0.0);
        assert!(!osc.is_enabled());
    }
}
