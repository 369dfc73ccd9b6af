//! Status bar: screen tabs, engine clock, envelope stage, held keys, levels

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keysynth::synth::EngineSnapshot;

use super::{state::Screen, TRIGGER_KEYS};

pub struct LevelStats {
    pub peak: f32,
    pub rms: f32,
}

impl LevelStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_tabs(frame: &mut Frame, area: Rect, current: Screen) {
    let mut spans = Vec::with_capacity(Screen::ALL.len() * 2);
    for (i, screen) in Screen::ALL.into_iter().enumerate() {
        let style = if screen == current {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" F{} {} ", i + 1, screen.title()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_status(frame: &mut Frame, area: Rect, snapshot: &EngineSnapshot, levels: &LevelStats) {
    let block = Block::default().title(" keysynth ").borders(Borders::ALL);

    let keys: String = TRIGGER_KEYS
        .iter()
        .enumerate()
        .map(|(i, &key)| if snapshot.is_held(i) { key.to_ascii_uppercase() } else { '·' })
        .collect();

    let env = &snapshot.envelope;
    let gate_color = if env.note_on { Color::Green } else { Color::Yellow };

    let line = Line::from(vec![
        Span::styled(format!(" {:.1}kHz  ", snapshot.sample_rate / 1000.0), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:>8.2}s  ", snapshot.time), Style::default().fg(Color::White)),
        Span::styled(format!("[{}]  ", keys), Style::default().fg(gate_color)),
        Span::styled(
            format!("{:?} {:.2}  ", env.state, env.level),
            Style::default().fg(gate_color),
        ),
        Span::styled(
            format!("out {:>3}  ", snapshot.last_output),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", levels.peak, levels.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
