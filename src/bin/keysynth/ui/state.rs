//! Screen navigation and parameter editing for the controller
//!
//! Everything here is pure: screens change through `Screen::transition`, and
//! edits are computed from the latest `EngineSnapshot` into a
//! `ParameterUpdate` for the audio thread. No engine state lives in the UI
//! beyond the one edit still in flight.

use keysynth::{
    dsp::{
        chorus::ChorusParam, delay::DelayParam, effects::EffectParam, envelope::EnvParam,
        filter::{FilterKind, FilterParam}, oscillator::OscParam, reverb::ReverbParam,
    },
    synth::{EngineSnapshot, ParamTarget, ParameterUpdate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Oscillators,
    Envelope,
    Filters,
    Effects,
}

/// Navigation inputs understood by the screen state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Next,
    Prev,
    Back,
    Jump(Screen),
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Home,
        Screen::Oscillators,
        Screen::Envelope,
        Screen::Filters,
        Screen::Effects,
    ];

    /// Transition table
    ///
    /// | from        | Next        | Prev        | Back |
    /// |-------------|-------------|-------------|------|
    /// | Home        | Oscillators | Effects     | Home |
    /// | Oscillators | Envelope    | Home        | Home |
    /// | Envelope    | Filters     | Oscillators | Home |
    /// | Filters     | Effects     | Envelope    | Home |
    /// | Effects     | Home        | Filters     | Home |
    ///
    /// `Jump(s)` goes to `s` from anywhere.
    pub fn transition(self, nav: Nav) -> Screen {
        use Screen::*;
        match (self, nav) {
            (_, Nav::Jump(to)) => to,
            (_, Nav::Back) => Home,
            (Home, Nav::Next) => Oscillators,
            (Oscillators, Nav::Next) => Envelope,
            (Envelope, Nav::Next) => Filters,
            (Filters, Nav::Next) => Effects,
            (Effects, Nav::Next) => Home,
            (Home, Nav::Prev) => Effects,
            (Oscillators, Nav::Prev) => Home,
            (Envelope, Nav::Prev) => Oscillators,
            (Filters, Nav::Prev) => Envelope,
            (Effects, Nav::Prev) => Filters,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Oscillators => "Oscillators",
            Screen::Envelope => "Envelope",
            Screen::Filters => "Filters",
            Screen::Effects => "Effects",
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            Screen::Home => &[],
            Screen::Oscillators => &OSCILLATOR_FIELDS,
            Screen::Envelope => &ENVELOPE_FIELDS,
            Screen::Filters => &FILTER_FIELDS,
            Screen::Effects => &EFFECT_FIELDS,
        }
    }
}

/// One editable row on a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Which oscillator the rows below edit; local to the UI
    OscSelect,
    Osc(OscParam),
    Env(EnvParam),
    Filter(FilterKind, FilterParam),
    Effect(EffectParam),
}

const OSCILLATOR_FIELDS: [Field; 6] = [
    Field::OscSelect,
    Field::Osc(OscParam::Enabled),
    Field::Osc(OscParam::WaveType),
    Field::Osc(OscParam::OctaveShift),
    Field::Osc(OscParam::Amplitude),
    Field::Osc(OscParam::Frequency),
];

const ENVELOPE_FIELDS: [Field; 5] = [
    Field::Env(EnvParam::Enabled),
    Field::Env(EnvParam::Attack),
    Field::Env(EnvParam::Decay),
    Field::Env(EnvParam::Sustain),
    Field::Env(EnvParam::Release),
];

const FILTER_FIELDS: [Field; 6] = [
    Field::Filter(FilterKind::LowPass, FilterParam::Enabled),
    Field::Filter(FilterKind::LowPass, FilterParam::Cutoff),
    Field::Filter(FilterKind::LowPass, FilterParam::Resonance),
    Field::Filter(FilterKind::HighPass, FilterParam::Enabled),
    Field::Filter(FilterKind::HighPass, FilterParam::Cutoff),
    Field::Filter(FilterKind::HighPass, FilterParam::Resonance),
];

const EFFECT_FIELDS: [Field; 9] = [
    Field::Effect(EffectParam::Reverb(ReverbParam::Enabled)),
    Field::Effect(EffectParam::Reverb(ReverbParam::Decay)),
    Field::Effect(EffectParam::Reverb(ReverbParam::Length)),
    Field::Effect(EffectParam::Delay(DelayParam::Enabled)),
    Field::Effect(EffectParam::Delay(DelayParam::Feedback)),
    Field::Effect(EffectParam::Delay(DelayParam::Length)),
    Field::Effect(EffectParam::Chorus(ChorusParam::Enabled)),
    Field::Effect(EffectParam::Chorus(ChorusParam::Depth)),
    Field::Effect(EffectParam::Chorus(ChorusParam::Rate)),
];

/// How a row responds to Left/Right
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Toggle,
    /// Cycle through `n` discrete values
    Cycle(u32),
    Add(f32),
    Scale(f32),
}

impl Field {
    fn step(self) -> Step {
        match self {
            Field::OscSelect => Step::Add(1.0),
            Field::Osc(OscParam::Enabled)
            | Field::Env(EnvParam::Enabled)
            | Field::Filter(_, FilterParam::Enabled)
            | Field::Effect(EffectParam::Reverb(ReverbParam::Enabled))
            | Field::Effect(EffectParam::Delay(DelayParam::Enabled))
            | Field::Effect(EffectParam::Chorus(ChorusParam::Enabled)) => Step::Toggle,
            Field::Osc(OscParam::WaveType) => Step::Cycle(4),
            Field::Osc(OscParam::OctaveShift) => Step::Add(1.0),
            Field::Osc(OscParam::Amplitude) => Step::Add(0.05),
            // one semitone
            Field::Osc(OscParam::Frequency) => Step::Scale(1.059_463_1),
            Field::Env(EnvParam::Sustain) => Step::Add(0.05),
            Field::Env(_) => Step::Scale(1.25),
            // a sixth of an octave
            Field::Filter(_, FilterParam::Cutoff) => Step::Scale(1.122_462),
            Field::Filter(_, FilterParam::Resonance) => Step::Add(0.1),
            Field::Effect(EffectParam::Reverb(ReverbParam::Decay)) => Step::Add(0.05),
            Field::Effect(EffectParam::Delay(DelayParam::Feedback)) => Step::Add(0.05),
            // 10ms at 48kHz
            Field::Effect(EffectParam::Reverb(ReverbParam::Length))
            | Field::Effect(EffectParam::Delay(DelayParam::Length)) => Step::Add(480.0),
            Field::Effect(EffectParam::Chorus(ChorusParam::Depth)) => Step::Add(20.0),
            Field::Effect(EffectParam::Chorus(ChorusParam::Rate)) => Step::Add(0.25),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::OscSelect => "Oscillator",
            Field::Osc(OscParam::Enabled) => "On",
            Field::Osc(OscParam::WaveType) => "Wave",
            Field::Osc(OscParam::OctaveShift) => "Octave",
            Field::Osc(OscParam::Amplitude) => "Amplitude",
            Field::Osc(OscParam::Frequency) => "Base pitch",
            Field::Env(EnvParam::Enabled) => "On",
            Field::Env(EnvParam::Attack) => "Attack",
            Field::Env(EnvParam::Decay) => "Decay",
            Field::Env(EnvParam::Sustain) => "Sustain",
            Field::Env(EnvParam::Release) => "Release",
            Field::Filter(FilterKind::LowPass, FilterParam::Enabled) => "Low-pass on",
            Field::Filter(FilterKind::LowPass, FilterParam::Cutoff) => "Low-pass cutoff",
            Field::Filter(FilterKind::LowPass, FilterParam::Resonance) => "Low-pass Q",
            Field::Filter(FilterKind::HighPass, FilterParam::Enabled) => "High-pass on",
            Field::Filter(FilterKind::HighPass, FilterParam::Cutoff) => "High-pass cutoff",
            Field::Filter(FilterKind::HighPass, FilterParam::Resonance) => "High-pass Q",
            Field::Effect(EffectParam::Reverb(ReverbParam::Enabled)) => "Reverb on",
            Field::Effect(EffectParam::Reverb(ReverbParam::Decay)) => "Reverb decay",
            Field::Effect(EffectParam::Reverb(ReverbParam::Length)) => "Reverb length",
            Field::Effect(EffectParam::Delay(DelayParam::Enabled)) => "Delay on",
            Field::Effect(EffectParam::Delay(DelayParam::Feedback)) => "Delay feedback",
            Field::Effect(EffectParam::Delay(DelayParam::Length)) => "Delay length",
            Field::Effect(EffectParam::Chorus(ChorusParam::Enabled)) => "Chorus on",
            Field::Effect(EffectParam::Chorus(ChorusParam::Depth)) => "Chorus depth",
            Field::Effect(EffectParam::Chorus(ChorusParam::Rate)) => "Chorus rate",
        }
    }

    /// Engine parameter this row edits, if any.
    pub fn target(self, oscillator: usize) -> Option<ParamTarget> {
        match self {
            Field::OscSelect => None,
            Field::Osc(p) => Some(ParamTarget::Oscillator(oscillator, p)),
            Field::Env(p) => Some(ParamTarget::Envelope(p)),
            Field::Filter(kind, p) => Some(ParamTarget::Filter(kind, p)),
            Field::Effect(p) => Some(ParamTarget::Effect(p)),
        }
    }

    /// Current value of this row as the engine reports it.
    pub fn value(self, snapshot: &EngineSnapshot, oscillator: usize) -> f32 {
        let flag = |on: bool| if on { 1.0 } else { 0.0 };
        let fx = &snapshot.effects;
        match self {
            Field::OscSelect => oscillator as f32,
            Field::Osc(p) => {
                let Some(osc) = snapshot.oscillators().get(oscillator) else {
                    return 0.0;
                };
                match p {
                    OscParam::Enabled => flag(osc.enabled),
                    OscParam::Frequency => osc.base_frequency,
                    OscParam::Amplitude => osc.amplitude,
                    OscParam::WaveType => osc.wave.index() as f32,
                    OscParam::OctaveShift => osc.octave_shift as f32,
                }
            }
            Field::Env(p) => {
                let env = &snapshot.envelope;
                match p {
                    EnvParam::Enabled => flag(env.enabled),
                    EnvParam::Attack => env.attack,
                    EnvParam::Decay => env.decay,
                    EnvParam::Sustain => env.sustain,
                    EnvParam::Release => env.release,
                }
            }
            Field::Filter(kind, p) => {
                let filter = snapshot.filter(kind);
                match p {
                    FilterParam::Enabled => flag(filter.enabled),
                    FilterParam::Cutoff => filter.cutoff,
                    FilterParam::Resonance => filter.resonance,
                }
            }
            Field::Effect(EffectParam::Reverb(p)) => match p {
                ReverbParam::Enabled => flag(fx.reverb.enabled),
                ReverbParam::Decay => fx.reverb.decay,
                ReverbParam::Length => fx.reverb.delay_length as f32,
            },
            Field::Effect(EffectParam::Delay(p)) => match p {
                DelayParam::Enabled => flag(fx.delay.enabled),
                DelayParam::Feedback => fx.delay.feedback,
                DelayParam::Length => fx.delay.delay_length as f32,
            },
            Field::Effect(EffectParam::Chorus(p)) => match p {
                ChorusParam::Enabled => flag(fx.chorus.enabled),
                ChorusParam::Depth => fx.chorus.depth,
                ChorusParam::Rate => fx.chorus.rate,
            },
        }
    }

    /// Value after one step in `direction` (+1 or -1) from `current`.
    /// The engine clamps; this only has to move in the right direction.
    fn stepped(self, current: f32, direction: i32) -> f32 {
        match self.step() {
            Step::Toggle => {
                if current != 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Step::Cycle(n) => {
                let n = n as i32;
                ((current.round() as i32 + direction).rem_euclid(n)) as f32
            }
            Step::Add(delta) => current + delta * direction as f32,
            Step::Scale(factor) => {
                if direction >= 0 {
                    current * factor
                } else {
                    current / factor
                }
            }
        }
    }
}

/// What an edit asks the app to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edit {
    Send(ParameterUpdate),
    /// Pick another oscillator to edit
    Select(usize),
}

/// Engine seconds an unconfirmed edit is trusted over the snapshot
const PENDING_TIMEOUT: f64 = 0.1;

/// An edit sent to the engine that no snapshot has reflected yet
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    field: Field,
    oscillator: usize,
    value: f32,
    /// Snapshot time when the edit was sent
    sent_at: f64,
}

/// Controller state owned by the UI thread
#[derive(Debug, Clone, Copy, Default)]
pub struct UiState {
    pub screen: Screen,
    pub cursor: usize,
    pub oscillator: usize,
    pending: Option<Pending>,
}

impl UiState {
    pub fn navigate(&mut self, nav: Nav) {
        let next = self.screen.transition(nav);
        if next != self.screen {
            self.screen = next;
            self.cursor = 0;
            self.pending = None;
        }
    }

    pub fn field(&self) -> Option<Field> {
        self.screen.fields().get(self.cursor).copied()
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let len = self.screen.fields().len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as i32 + delta).rem_euclid(len as i32) as usize;
    }

    /// Left/Right on the selected row.
    ///
    /// Steps from the last value sent for this row while the snapshot still
    /// lags behind it, so quick repeated presses accumulate.
    pub fn adjust(&mut self, snapshot: &EngineSnapshot, direction: i32) -> Option<Edit> {
        let field = self.field()?;

        if field == Field::OscSelect {
            let count = snapshot.oscillators().len() as i32;
            if count == 0 {
                return None;
            }
            let next = (self.oscillator as i32 + direction).rem_euclid(count);
            return Some(Edit::Select(next as usize));
        }

        let target = field.target(self.oscillator)?;
        let current = match self.pending {
            Some(p) if p.field == field && p.oscillator == self.oscillator => p.value,
            _ => field.value(snapshot, self.oscillator),
        };
        let value = field.stepped(current, direction);
        self.pending = Some(Pending {
            field,
            oscillator: self.oscillator,
            value,
            sent_at: snapshot.time,
        });
        Some(Edit::Send(ParameterUpdate::new(target, value)))
    }

    /// Drop the in-flight edit once a snapshot shows it, or once the engine
    /// has run long enough that a clamped value must have landed.
    pub fn observe(&mut self, snapshot: &EngineSnapshot) {
        let Some(p) = self.pending else {
            return;
        };
        let reported = p.field.value(snapshot, p.oscillator);
        let landed = (reported - p.value).abs() <= f32::EPSILON * p.value.abs().max(1.0);
        if landed || snapshot.time - p.sent_at > PENDING_TIMEOUT {
            self.pending = None;
        }
    }

    /// Enter on the selected row: flips toggles and cycles choices.
    pub fn activate(&mut self, snapshot: &EngineSnapshot) -> Option<Edit> {
        match self.field()?.step() {
            Step::Toggle | Step::Cycle(_) => self.adjust(snapshot, 1),
            _ => None,
        }
    }

    pub fn select(&mut self, oscillator: usize) {
        self.oscillator = oscillator;
        self.pending = None;
    }
}
