use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    dsp::{
        chorus::Chorus,
        delay::Delay,
        effects::EffectProcessor,
        envelope::Envelope,
        filter::{Biquad, FilterKind, FilterParam},
        node::{Parameterized, RenderCtx},
        oscillator::Oscillator,
        reverb::Reverb,
    },
    error::{Error, Result},
    io::{converter::quantize, sink::SampleSink},
    synth::{
        message::{Gate, ParamTarget, ParameterUpdate, SynthMessage, TriggerEvent},
        snapshot::EngineSnapshot,
    },
    MAX_OSCILLATORS,
};

/// Trigger sources are tracked in a `u32` bitmask.
pub const MAX_TRIGGER_SOURCES: usize = 32;

/*
Engine
======

The engine owns every stage and runs them in a fixed order for each sample:

    oscillators ──(sum / count)──→ envelope ──→ low-pass ──→ high-pass
        ──→ reverb ──→ delay ──→ chorus ──→ quantize to u8

Controllers never touch the stages directly. They send `ParameterUpdate`s
(applied through `apply`) and `TriggerEvent`s (through `trigger`), and read
state back through `snapshot`.

Time
----

`render_sample(timestamp)` renders one sample at an explicit time; this is
the one-sample-per-trigger mode. `tick()` renders at the engine's own clock
(frames rendered / sample rate) and advances it, for continuous playback
from an audio callback.

Gate
----

The envelope is shared. Trigger sources are keys: the first key down opens
the gate, the last key up closes it. Pressing more keys while one is held
does not retrigger the attack.
*/

#[derive(Debug, Clone)]
pub struct Engine {
    sample_rate: f32,
    oscillators: Vec<Oscillator>,
    envelope: Envelope,
    low_pass: Biquad,
    high_pass: Biquad,
    effects: EffectProcessor,
    held_sources: u32,
    frames: u64,
    last_output: u8,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let sample_rate = config.sample_rate;

        let oscillators = config
            .oscillators
            .iter()
            .map(|osc| {
                Oscillator::new(osc.frequency)
                    .with_amplitude(osc.amplitude)
                    .with_wave(osc.wave)
                    .with_octave_shift(osc.octave_shift)
                    .with_enabled(osc.enabled)
            })
            .collect::<Vec<_>>();

        let env = &config.envelope;
        let envelope = Envelope::adsr(env.attack, env.decay, env.sustain, env.release)
            .with_enabled(env.enabled);

        let filter = |kind: FilterKind| {
            let settings = config.filter(kind);
            Biquad::new(kind, settings.cutoff_for(kind), settings.resonance, sample_rate)
                .with_enabled(settings.enabled)
        };

        let effects = EffectProcessor::new(
            Reverb::new(config.reverb.length, config.reverb.decay)
                .with_enabled(config.reverb.enabled),
            Delay::new(config.delay.length, config.delay.feedback)
                .with_enabled(config.delay.enabled),
            Chorus::new(config.chorus.depth, config.chorus.rate)
                .with_enabled(config.chorus.enabled),
        );

        info!(
            sample_rate,
            oscillators = oscillators.len(),
            "engine ready"
        );

        Ok(Self {
            sample_rate,
            oscillators,
            envelope,
            low_pass: filter(FilterKind::LowPass),
            high_pass: filter(FilterKind::HighPass),
            effects,
            held_sources: 0,
            frames: 0,
            last_output: 128,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Engine clock: seconds of audio rendered by `tick`.
    pub fn now(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    /// Run the full pipeline once at `timestamp`, before quantization.
    pub fn next_sample(&mut self, timestamp: f64) -> f32 {
        let ctx = RenderCtx::new(self.sample_rate, timestamp);

        let sum: f32 = self
            .oscillators
            .iter_mut()
            .map(|osc| osc.generate_wave(&ctx))
            .sum();
        let mix = sum / self.oscillators.len() as f32;

        let mut sample = self.envelope.apply_envelope(mix, &ctx);
        self.low_pass.apply_filter(&mut sample);
        self.high_pass.apply_filter(&mut sample);
        self.effects.process(sample, &ctx)
    }

    /// Render exactly one quantized sample at `timestamp`.
    pub fn render_sample(&mut self, timestamp: f64) -> u8 {
        let out = quantize(self.next_sample(timestamp));
        self.last_output = out;
        out
    }

    /// Render one sample and hand it to `sink`.
    pub fn render_into<S: SampleSink>(&mut self, timestamp: f64, sink: &mut S) -> Result<u8, S::Error> {
        let out = self.render_sample(timestamp);
        sink.emit(out)?;
        Ok(out)
    }

    /// Render at the engine clock and advance it by one frame.
    pub fn tick(&mut self) -> u8 {
        let out = self.render_sample(self.now());
        self.advance(1);
        out
    }

    /// Move the engine clock forward without rendering.
    pub fn advance(&mut self, frames: u64) {
        self.frames += frames;
    }

    pub fn render_block(&mut self, out: &mut [u8]) {
        for sample in out.iter_mut() {
            *sample = self.tick();
        }
    }

    pub fn handle(&mut self, message: SynthMessage) -> Result<()> {
        match message {
            SynthMessage::Parameter(update) => self.apply(update),
            SynthMessage::Trigger(event) => self.trigger(event),
            SynthMessage::AllNotesOff => {
                self.all_notes_off(self.now());
                Ok(())
            }
        }
    }

    /// Apply a clamped parameter change. Filter cutoff and resonance edits
    /// recompute that filter's coefficients before returning.
    pub fn apply(&mut self, update: ParameterUpdate) -> Result<()> {
        let ParameterUpdate { target, value } = update;
        match target {
            ParamTarget::Oscillator(index, param) => {
                let len = self.oscillators.len();
                self.oscillators
                    .get_mut(index)
                    .ok_or(Error::UnknownOscillator { index, len })?
                    .set_param(param, value);
            }
            ParamTarget::Envelope(param) => self.envelope.set_param(param, value),
            ParamTarget::Filter(kind, param) => {
                let sample_rate = self.sample_rate;
                let filter = self.filter_mut(kind);
                filter.set_param(param, value);
                if !matches!(param, FilterParam::Enabled) {
                    filter.calculate_coefficients(sample_rate);
                }
            }
            ParamTarget::Effect(param) => self.effects.set_param(param, value),
        }
        Ok(())
    }

    /// Read back the value a parameter currently holds (after clamping).
    pub fn get_param(&self, target: ParamTarget) -> Result<f32> {
        Ok(match target {
            ParamTarget::Oscillator(index, param) => self
                .oscillators
                .get(index)
                .ok_or(Error::UnknownOscillator {
                    index,
                    len: self.oscillators.len(),
                })?
                .get_param(param),
            ParamTarget::Envelope(param) => self.envelope.get_param(param),
            ParamTarget::Filter(kind, param) => self.filter(kind).get_param(param),
            ParamTarget::Effect(param) => self.effects.get_param(param),
        })
    }

    pub fn trigger(&mut self, event: TriggerEvent) -> Result<()> {
        if event.source_index >= MAX_TRIGGER_SOURCES {
            return Err(Error::UnknownSource(event.source_index));
        }
        let bit = 1u32 << event.source_index;

        match event.gate {
            Gate::On => {
                if self.held_sources == 0 {
                    self.envelope.note_on(event.timestamp);
                }
                self.held_sources |= bit;
            }
            Gate::Off => {
                let was_held = self.held_sources != 0;
                self.held_sources &= !bit;
                if was_held && self.held_sources == 0 {
                    self.envelope.note_off(event.timestamp);
                }
            }
        }
        Ok(())
    }

    pub fn all_notes_off(&mut self, time: f64) {
        self.held_sources = 0;
        self.envelope.note_off(time);
    }

    /// Silence every stage's state and restart the clock. Parameters are kept.
    pub fn reset(&mut self) {
        debug!("engine reset");
        self.oscillators.iter_mut().for_each(Oscillator::reset);
        self.envelope.reset();
        self.low_pass.reset();
        self.high_pass.reset();
        self.effects.reset();
        self.held_sources = 0;
        self.frames = 0;
    }

    pub fn oscillators(&self) -> &[Oscillator] {
        &self.oscillators
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn filter(&self, kind: FilterKind) -> &Biquad {
        match kind {
            FilterKind::LowPass => &self.low_pass,
            FilterKind::HighPass => &self.high_pass,
        }
    }

    fn filter_mut(&mut self, kind: FilterKind) -> &mut Biquad {
        match kind {
            FilterKind::LowPass => &mut self.low_pass,
            FilterKind::HighPass => &mut self.high_pass,
        }
    }

    pub fn effects(&self) -> &EffectProcessor {
        &self.effects
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let time = self.now();
        let mut oscillators = [Default::default(); MAX_OSCILLATORS];
        for (slot, osc) in oscillators.iter_mut().zip(&self.oscillators) {
            *slot = osc.snapshot();
        }

        EngineSnapshot {
            sample_rate: self.sample_rate,
            time,
            oscillators,
            num_oscillators: self.oscillators.len() as u8,
            envelope: self.envelope.snapshot(time),
            low_pass: self.low_pass.snapshot(),
            high_pass: self.high_pass.snapshot(),
            effects: self.effects.snapshot(),
            held_sources: self.held_sources,
            last_output: self.last_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::OscillatorConfig,
        dsp::{
            effects::EffectParam, envelope::EnvParam, oscillator::OscParam,
            reverb::ReverbParam,
        },
    };

    fn single(frequency: f32) -> Engine {
        Engine::new(&EngineConfig::single(OscillatorConfig::at(frequency))).unwrap()
    }

    #[test]
    fn bypassed_pipeline_quantizes_the_oscillator() {
        let mut engine = single(1046.50);
        let mut reference = Oscillator::new(1046.50);
        let ctx = RenderCtx::new(engine.sample_rate(), 0.0);

        for i in 0..200 {
            let expected = reference.generate_wave(&ctx);
            let expected = (127.5 * (expected + 1.0)).round() as u8;
            assert_eq!(engine.render_sample(i as f64 / 48_000.0), expected);
        }
    }

    #[test]
    fn mix_divides_by_bank_size() {
        let mut config = EngineConfig::single(OscillatorConfig::at(440.0));
        config.oscillators.push(OscillatorConfig {
            enabled: false,
            ..OscillatorConfig::at(880.0)
        });
        let mut engine = Engine::new(&config).unwrap();
        let mut reference = Oscillator::new(440.0);
        let ctx = RenderCtx::new(48_000.0, 0.0);

        for _ in 0..32 {
            let expected = reference.generate_wave(&ctx) / 2.0;
            assert_eq!(engine.next_sample(0.0), expected);
        }
    }

    #[test]
    fn filter_updates_recompute_coefficients() {
        let mut engine = Engine::new(&EngineConfig::default()).unwrap();
        let before = engine.filter(FilterKind::LowPass).coefficients();

        engine
            .apply(ParameterUpdate::new(
                ParamTarget::Filter(FilterKind::LowPass, FilterParam::Cutoff),
                1_200.0,
            ))
            .unwrap();

        let after = engine.filter(FilterKind::LowPass).coefficients();
        assert_ne!(before, after);
        assert_eq!(engine.filter(FilterKind::LowPass).cutoff(), 1_200.0);
    }

    #[test]
    fn cutoff_above_nyquist_is_clamped_on_apply() {
        let mut engine = Engine::new(&EngineConfig::default()).unwrap();
        let target = ParamTarget::Filter(FilterKind::HighPass, FilterParam::Cutoff);
        engine.apply(ParameterUpdate::new(target, 1e9)).unwrap();
        assert_eq!(engine.get_param(target).unwrap(), 48_000.0 * 0.45);
    }

    #[test]
    fn unknown_oscillator_is_rejected() {
        let mut engine = Engine::new(&EngineConfig::default()).unwrap();
        let err = engine
            .apply(ParameterUpdate::new(
                ParamTarget::Oscillator(7, OscParam::Amplitude),
                0.5,
            ))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownOscillator { index: 7, len: 7 }));
    }

    #[test]
    fn out_of_range_values_clamp() {
        let mut engine = Engine::new(&EngineConfig::default()).unwrap();
        let shift = ParamTarget::Oscillator(0, OscParam::OctaveShift);
        engine.apply(ParameterUpdate::new(shift, 12.0)).unwrap();
        assert_eq!(engine.get_param(shift).unwrap(), 3.0);

        let decay = ParamTarget::Effect(EffectParam::Reverb(ReverbParam::Decay));
        engine.apply(ParameterUpdate::new(decay, 1.5)).unwrap();
        assert_eq!(engine.get_param(decay).unwrap(), 1.0);
    }

    #[test]
    fn gate_follows_first_press_and_last_release() {
        let mut engine = Engine::new(&EngineConfig::default()).unwrap();
        engine.trigger(TriggerEvent::on(0, 1.0)).unwrap();
        engine.trigger(TriggerEvent::on(3, 1.5)).unwrap();
        assert!(engine.envelope().is_note_on());
        // second press did not restart the attack
        assert_eq!(engine.envelope().state_at(1.5), crate::dsp::envelope::EnvelopeState::Sustain);

        engine.trigger(TriggerEvent::off(0, 2.0)).unwrap();
        assert!(engine.envelope().is_note_on());
        engine.trigger(TriggerEvent::off(3, 2.5)).unwrap();
        assert!(!engine.envelope().is_note_on());
        assert_eq!(engine.snapshot().held_sources, 0);
    }

    #[test]
    fn trigger_source_out_of_range() {
        let mut engine = Engine::new(&EngineConfig::default()).unwrap();
        assert!(matches!(
            engine.trigger(TriggerEvent::on(32, 0.0)),
            Err(Error::UnknownSource(32))
        ));
    }

    #[test]
    fn envelope_silences_until_triggered() {
        let mut config = EngineConfig::single(OscillatorConfig::at(440.0));
        config.envelope.enabled = true;
        let mut engine = Engine::new(&config).unwrap();

        let mut block = vec![0u8; 256];
        engine.render_block(&mut block);
        assert!(block.iter().all(|&s| s == 128));

        engine.trigger(TriggerEvent::on(0, engine.now())).unwrap();
        engine.render_block(&mut block);
        assert!(block.iter().any(|&s| s != 128));
    }

    #[test]
    fn toggling_envelope_twice_restores_output() {
        let config = EngineConfig::default();
        let mut a = Engine::new(&config).unwrap();
        let mut b = Engine::new(&config).unwrap();
        let target = ParamTarget::Envelope(EnvParam::Enabled);
        b.apply(ParameterUpdate::toggle(target, false)).unwrap();
        b.apply(ParameterUpdate::toggle(target, true)).unwrap();

        a.trigger(TriggerEvent::on(0, 0.0)).unwrap();
        b.trigger(TriggerEvent::on(0, 0.0)).unwrap();
        for _ in 0..512 {
            assert_eq!(a.tick(), b.tick());
        }
    }

    #[test]
    fn snapshot_reflects_bank() {
        let engine = Engine::new(&EngineConfig::default()).unwrap();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.oscillators().len(), 7);
        assert_eq!(snapshot.oscillators()[6].base_frequency, 1975.53);
        assert!(snapshot.filter(FilterKind::LowPass).enabled);
    }

    #[test]
    fn render_into_emits_to_sink() {
        let mut engine = single(440.0);
        let mut sink = Vec::new();
        for i in 0..10 {
            let out = engine.render_into(i as f64, &mut sink).unwrap();
            assert_eq!(sink.last().copied(), Some(out));
        }
        assert_eq!(sink.len(), 10);
    }
}
