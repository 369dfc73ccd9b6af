//! Terminal controller
//!
//! Owns no synthesis state: it reads `EngineSnapshot`s and scope samples
//! from the audio thread and sends `SynthMessage`s back.

mod panels;
mod spectrum;
pub mod state;
mod status;
mod waveform;

use std::{
    io::stdout,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use tracing::{debug, warn};

use keysynth::synth::{EngineSnapshot, SynthMessage, TriggerEvent};

use panels::render_panel;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use state::{Edit, Nav, Screen, UiState};
use status::{render_status, render_tabs, LevelStats};
use waveform::render_waveform;

/// Keys mapped to trigger sources 0..6
pub const TRIGGER_KEYS: [char; 7] = ['a', 's', 'd', 'f', 'g', 'h', 'j'];

/// Samples kept for the spectrum; the scope shows the newest slice
const SCOPE_BUFFER_SIZE: usize = 2048;
const SCOPE_VIEW: usize = 512;

/// Without release events a key counts as held while autorepeat keeps
/// refreshing it. Must exceed the usual initial repeat delay.
const HOLD_TIMEOUT: Duration = Duration::from_millis(600);

pub struct UiApp {
    msg_tx: Producer<SynthMessage>,
    scope_rx: Consumer<f32>,
    snapshot_rx: Consumer<EngineSnapshot>,
    snapshot: EngineSnapshot,
    state: UiState,
    scope: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    /// Last press or repeat seen per trigger key
    held: [Option<Instant>; TRIGGER_KEYS.len()],
    release_events: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        msg_tx: Producer<SynthMessage>,
        scope_rx: Consumer<f32>,
        snapshot_rx: Consumer<EngineSnapshot>,
        initial: EngineSnapshot,
    ) -> Self {
        Self {
            msg_tx,
            scope_rx,
            snapshot_rx,
            snapshot: initial,
            state: UiState::default(),
            scope: vec![0.0; SCOPE_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(SCOPE_BUFFER_SIZE, initial.sample_rate),
            held: [None; TRIGGER_KEYS.len()],
            release_events: false,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.release_events = supports_keyboard_enhancement().unwrap_or(false);
        if self.release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        debug!(release_events = self.release_events, "controller started");

        let result = self.event_loop(terminal);

        self.send(SynthMessage::AllNotesOff);
        if self.release_events {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            self.poll_snapshots();
            self.expire_held_keys(Instant::now());

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn poll_scope(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
            received = true;
        }
        if self.scope.len() > SCOPE_BUFFER_SIZE {
            let excess = self.scope.len() - SCOPE_BUFFER_SIZE;
            self.scope.drain(0..excess);
        }
        if received {
            self.spectrum.update(&self.scope);
        }
    }

    /// Only the newest snapshot matters.
    fn poll_snapshots(&mut self) {
        while let Ok(snapshot) = self.snapshot_rx.pop() {
            self.snapshot = snapshot;
        }
        self.state.observe(&self.snapshot);
    }

    fn send(&mut self, msg: SynthMessage) {
        if self.msg_tx.push(msg).is_err() {
            warn!(?msg, "message ring full, dropping");
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char(c) = key.code {
            if let Some(source) = TRIGGER_KEYS.iter().position(|&k| k == c) {
                self.handle_trigger(source, key.kind);
                return;
            }
        }
        if key.kind == KeyEventKind::Release {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Tab => self.state.navigate(Nav::Next),
            KeyCode::BackTab => self.state.navigate(Nav::Prev),
            KeyCode::Esc => self.state.navigate(Nav::Back),
            KeyCode::F(n @ 1..=5) => self.state.navigate(Nav::Jump(Screen::ALL[n as usize - 1])),
            KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Left => {
                let edit = self.state.adjust(&self.snapshot, -1);
                self.apply_edit(edit);
            }
            KeyCode::Right => {
                let edit = self.state.adjust(&self.snapshot, 1);
                self.apply_edit(edit);
            }
            KeyCode::Enter => {
                let edit = self.state.activate(&self.snapshot);
                self.apply_edit(edit);
            }
            _ => {}
        }
    }

    fn handle_trigger(&mut self, source: usize, kind: KeyEventKind) {
        let now = Instant::now();
        match kind {
            KeyEventKind::Release => {
                if self.held[source].take().is_some() {
                    self.send(TriggerEvent::off(source, self.snapshot.time).into());
                }
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if self.held[source].replace(now).is_none() {
                    self.send(TriggerEvent::on(source, self.snapshot.time).into());
                }
            }
        }
    }

    fn expire_held_keys(&mut self, now: Instant) {
        if self.release_events {
            return;
        }
        for source in 0..self.held.len() {
            let expired = self.held[source]
                .is_some_and(|since| now.duration_since(since) > HOLD_TIMEOUT);
            if expired {
                self.held[source] = None;
                self.send(TriggerEvent::off(source, self.snapshot.time).into());
            }
        }
    }

    fn apply_edit(&mut self, edit: Option<Edit>) {
        match edit {
            Some(Edit::Send(update)) => {
                debug!(?update, "parameter edit");
                self.send(update.into());
            }
            Some(Edit::Select(index)) => self.state.select(index),
            None => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Screen tabs
                Constraint::Length(3),  // Status bar
                Constraint::Min(11),    // Parameter panel
                Constraint::Length(10), // Scope + spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(frame.area());

        render_tabs(frame, chunks[0], self.state.screen);

        let view = &self.scope[self.scope.len().saturating_sub(SCOPE_VIEW)..];
        render_status(frame, chunks[1], &self.snapshot, &LevelStats::from_buffer(view));

        render_panel(frame, chunks[2], &self.state, &self.snapshot);

        let scopes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[3]);
        render_waveform(frame, scopes[0], view);
        render_spectrum(frame, scopes[1], &self.spectrum);

        let help = Paragraph::new(
            " [asdfghj] Play  [Tab/F1-F5] Screen  [↑↓] Field  [←→] Adjust  [Enter] Toggle  [Esc] Home  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
