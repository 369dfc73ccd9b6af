use crate::{
    dsp::node::{flag, from_flag, Parameterized, RenderCtx},
    MIN_TIME,
};

/*
ADSR Envelope
=============

One envelope shapes the whole mix. Instead of stepping a level every sample,
the output is a pure function of the time elapsed since the last gate edge,
so rendering can resume at any timestamp without drift.

Vocabulary
----------

  gate        Note on/off. `note_on(t)` records the start time and opens the
              gate; `note_off(t)` records the release time and closes it.

  t           Seconds since note on (gate open).
  r           Seconds since note off (gate closed).


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Gate open:

    t < A          level = t / A
    t < A + D      level = (1 - (t - A) / D) * (1 - S) + S
    otherwise      level = S

Gate closed:

    r < R          level = S * (1 - r / R)
    otherwise      level = 0

Release always ramps from the sustain level, even when the gate closes
during attack or decay. This can click on very short notes; it is the
instrument's character.

Durations are clamped to at least MIN_TIME, so none of the divisions above
can divide by zero.
*/

/// Stage the envelope is in at a given time, derived from the gate timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeState {
    #[default]
    Idle, // Gate closed, release finished
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvParam {
    Enabled,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub const MAX_STAGE_TIME: f32 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvelopeSnapshot {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub enabled: bool,
    pub note_on: bool,
    pub state: EnvelopeState,
    pub level: f32,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_time: f32,   // seconds to ramp 0 → 1
    decay_time: f32,    // seconds to ramp 1 → sustain
    sustain_level: f32, // level to hold (0.0 - 1.0)
    release_time: f32,  // seconds to ramp sustain → 0

    note_on: bool,
    note_on_time: f64,
    note_off_time: f64,
    enabled: bool,
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.01, 0.1, 0.7, 0.3)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: clamp_time(attack),
            decay_time: clamp_time(decay),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: clamp_time(release),

            note_on: false,
            note_on_time: 0.0,
            // No release tail before the first note.
            note_off_time: f64::NEG_INFINITY,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Open the gate at `time` (seconds since engine start).
    pub fn note_on(&mut self, time: f64) {
        self.note_on = true;
        self.note_on_time = time;
    }

    /// Close the gate at `time`. Ignored while the gate is already closed.
    pub fn note_off(&mut self, time: f64) {
        if !self.note_on {
            return;
        }
        self.note_on = false;
        self.note_off_time = time;
    }

    /// Envelope gain at `time`, ignoring the bypass flag.
    pub fn level_at(&self, time: f64) -> f32 {
        if self.note_on {
            let t = (time - self.note_on_time).max(0.0) as f32;
            let peak = self.attack_time + self.decay_time;

            if t < self.attack_time {
                t / self.attack_time
            } else if t < peak {
                let progress = (t - self.attack_time) / self.decay_time;
                (1.0 - progress) * (1.0 - self.sustain_level) + self.sustain_level
            } else {
                self.sustain_level
            }
        } else {
            let r = (time - self.note_off_time).max(0.0);
            if r < self.release_time as f64 {
                self.sustain_level * (1.0 - r as f32 / self.release_time)
            } else {
                0.0
            }
        }
    }

    /// Shape `input` by the envelope at `ctx.time`. Pass-through when disabled.
    pub fn apply_envelope(&self, input: f32, ctx: &RenderCtx) -> f32 {
        if !self.enabled {
            return input;
        }
        input * self.level_at(ctx.time)
    }

    pub fn state_at(&self, time: f64) -> EnvelopeState {
        if self.note_on {
            let t = (time - self.note_on_time).max(0.0) as f32;
            if t < self.attack_time {
                EnvelopeState::Attack
            } else if t < self.attack_time + self.decay_time {
                EnvelopeState::Decay
            } else {
                EnvelopeState::Sustain
            }
        } else if time - self.note_off_time < self.release_time as f64 {
            EnvelopeState::Release
        } else {
            EnvelopeState::Idle
        }
    }

    pub fn is_note_on(&self) -> bool {
        self.note_on
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_time = clamp_time(seconds);
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.decay_time = clamp_time(seconds);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.sustain_level = level.clamp(0.0, 1.0);
    }

    pub fn set_release(&mut self, seconds: f32) {
        self.release_time = clamp_time(seconds);
    }

    /// Close the gate and drop any release tail.
    pub fn reset(&mut self) {
        self.note_on = false;
        self.note_on_time = 0.0;
        self.note_off_time = f64::NEG_INFINITY;
    }

    pub fn snapshot(&self, time: f64) -> EnvelopeSnapshot {
        EnvelopeSnapshot {
            attack: self.attack_time,
            decay: self.decay_time,
            sustain: self.sustain_level,
            release: self.release_time,
            enabled: self.enabled,
            note_on: self.note_on,
            state: self.state_at(time),
            level: self.level_at(time),
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Parameterized for Envelope {
    type Param = EnvParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            EnvParam::Enabled => from_flag(self.enabled),
            EnvParam::Attack => self.attack_time,
            EnvParam::Decay => self.decay_time,
            EnvParam::Sustain => self.sustain_level,
            EnvParam::Release => self.release_time,
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32) {
        match param {
            EnvParam::Enabled => self.enabled = flag(value),
            EnvParam::Attack => self.set_attack(value),
            EnvParam::Decay => self.set_decay(value),
            EnvParam::Sustain => self.set_sustain(value),
            EnvParam::Release => self.set_release(value),
        }
    }
}

fn clamp_time(seconds: f32) -> f32 {
    // NaN would slip through clamp and poison every division below
    if seconds.is_nan() {
        return MIN_TIME;
    }
    seconds.clamp(MIN_TIME, MAX_STAGE_TIME)
}
