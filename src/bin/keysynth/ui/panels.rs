//! Parameter panels, one per screen, drawn from the latest snapshot

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keysynth::{
    dsp::{
        delay::DelayParam, effects::EffectParam, envelope::EnvParam, filter::FilterParam,
        oscillator::{OscParam, Waveform},
        reverb::ReverbParam,
        chorus::ChorusParam,
    },
    synth::EngineSnapshot,
};

use super::{
    state::{Field, Screen, UiState},
    TRIGGER_KEYS,
};

pub fn render_panel(frame: &mut Frame, area: Rect, state: &UiState, snapshot: &EngineSnapshot) {
    let block = Block::default()
        .title(format!(" {} ", state.screen.title()))
        .borders(Borders::ALL);

    let lines = match state.screen {
        Screen::Home => home_lines(snapshot),
        screen => screen
            .fields()
            .iter()
            .enumerate()
            .map(|(i, &field)| field_line(field, i == state.cursor, state.oscillator, snapshot))
            .collect(),
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(field: Field, selected: bool, oscillator: usize, snapshot: &EngineSnapshot) -> Line<'static> {
    let marker = if selected { "▸ " } else { "  " };
    let style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    Line::from(vec![
        Span::styled(format!("{marker}{:<18}", field.label()), style),
        Span::styled(format_value(field, oscillator, snapshot), style),
    ])
}

fn format_value(field: Field, oscillator: usize, snapshot: &EngineSnapshot) -> String {
    let value = field.value(snapshot, oscillator);
    let on_off = |v: f32| (if v != 0.0 { "on" } else { "off" }).to_string();

    match field {
        Field::OscSelect => format!("{} / {}", oscillator + 1, snapshot.oscillators().len()),
        Field::Osc(OscParam::Enabled)
        | Field::Env(EnvParam::Enabled)
        | Field::Filter(_, FilterParam::Enabled)
        | Field::Effect(EffectParam::Reverb(ReverbParam::Enabled))
        | Field::Effect(EffectParam::Delay(DelayParam::Enabled))
        | Field::Effect(EffectParam::Chorus(ChorusParam::Enabled)) => on_off(value),
        Field::Osc(OscParam::WaveType) => Waveform::from_index(value as usize).name().to_string(),
        Field::Osc(OscParam::OctaveShift) => format!("{:+}", value as i32),
        Field::Osc(OscParam::Frequency) => {
            let sounding = snapshot
                .oscillators()
                .get(oscillator)
                .map(|o| o.frequency)
                .unwrap_or(value);
            format!("{value:.2} Hz  (sounding {sounding:.2} Hz)")
        }
        Field::Env(EnvParam::Sustain) | Field::Osc(OscParam::Amplitude) => format!("{value:.2}"),
        Field::Env(_) => format!("{:.0} ms", value * 1000.0),
        Field::Filter(_, FilterParam::Cutoff) => format!("{value:.0} Hz"),
        Field::Filter(_, FilterParam::Resonance) => format!("{value:.2}"),
        Field::Effect(EffectParam::Reverb(ReverbParam::Length))
        | Field::Effect(EffectParam::Delay(DelayParam::Length)) => format!(
            "{:.0} samples ({:.0} ms)",
            value,
            value * 1000.0 / snapshot.sample_rate
        ),
        Field::Effect(EffectParam::Chorus(ChorusParam::Depth)) => format!("{value:.0} samples"),
        Field::Effect(EffectParam::Chorus(ChorusParam::Rate)) => format!("{value:.2} Hz"),
        Field::Effect(_) => format!("{value:.2}"),
    }
}

fn home_lines(snapshot: &EngineSnapshot) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Hold a s d f g h j to play; every key gates the whole bank.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    for (i, osc) in snapshot.oscillators().iter().enumerate() {
        let key = TRIGGER_KEYS.get(i).copied().unwrap_or(' ');
        let style = if osc.enabled {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(Span::styled(
            format!(
                " [{key}] {:>8.2} Hz  {:<8}  oct {:+}  amp {:.2}",
                osc.frequency,
                osc.wave.name(),
                osc.octave_shift,
                osc.amplitude
            ),
            style,
        )));
    }

    let fx = &snapshot.effects;
    let stage = |name: &str, on: bool| {
        Span::styled(
            format!(" {name} "),
            if on {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        )
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        stage("ENV", snapshot.envelope.enabled),
        Span::raw("→"),
        stage("LP", snapshot.low_pass.enabled),
        Span::raw("→"),
        stage("HP", snapshot.high_pass.enabled),
        Span::raw("→"),
        stage("REV", fx.reverb.enabled),
        Span::raw("→"),
        stage("DLY", fx.delay.enabled),
        Span::raw("→"),
        stage("CHO", fx.chorus.enabled),
    ]));
    lines
}
