use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::dsp::{
    effects::EffectParam, envelope::EnvParam, filter::FilterKind, filter::FilterParam,
    oscillator::OscParam,
};

/// Which component and field a [`ParameterUpdate`] edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamTarget {
    Oscillator(usize, OscParam),
    Envelope(EnvParam),
    Filter(FilterKind, FilterParam),
    Effect(EffectParam),
}

/// Set one parameter to an absolute value; the engine clamps it into range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterUpdate {
    pub target: ParamTarget,
    pub value: f32,
}

impl ParameterUpdate {
    pub fn new(target: ParamTarget, value: f32) -> Self {
        Self { target, value }
    }

    pub fn toggle(target: ParamTarget, on: bool) -> Self {
        Self::new(target, if on { 1.0 } else { 0.0 })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    On,
    Off,
}

/// A key edge from the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    pub source_index: usize,
    /// Seconds since engine start
    pub timestamp: f64,
    pub gate: Gate,
}

impl TriggerEvent {
    pub fn on(source_index: usize, timestamp: f64) -> Self {
        Self {
            source_index,
            timestamp,
            gate: Gate::On,
        }
    }

    pub fn off(source_index: usize, timestamp: f64) -> Self {
        Self {
            source_index,
            timestamp,
            gate: Gate::Off,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    Parameter(ParameterUpdate),
    Trigger(TriggerEvent),
    AllNotesOff,
}

impl SynthMessage {
    /// Replace a trigger's timestamp with `time`, e.g. the audio thread's clock.
    pub fn stamped(self, time: f64) -> Self {
        match self {
            SynthMessage::Trigger(event) => SynthMessage::Trigger(TriggerEvent {
                timestamp: time,
                ..event
            }),
            other => other,
        }
    }
}

impl From<ParameterUpdate> for SynthMessage {
    fn from(update: ParameterUpdate) -> Self {
        SynthMessage::Parameter(update)
    }
}

impl From<TriggerEvent> for SynthMessage {
    fn from(event: TriggerEvent) -> Self {
        SynthMessage::Trigger(event)
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Scripted message source for offline rendering and tests.
impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
