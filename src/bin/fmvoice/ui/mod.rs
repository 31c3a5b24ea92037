//! TUI for fmvoice
//!
//! Plays the voice from the computer keyboard and shows its controls, both
//! output channels against the envelope, and the left channel's spectrum.

mod controls;
mod spectrum;
pub mod state;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags,
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
use rtrb::Consumer;
use std::{io::stdout, time::Duration};
use tracing::warn;

use fm_voice::{
    control::{group_controls, ControlId, EnvelopeParam, Resolution, PAN_RANGE},
    dsp::StereoFrame,
    synth::VoiceHandle,
};

pub use state::VoiceStatus;

use controls::render_controls;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats};
use waveform::render_waveform;

/// Scope and FFT length
pub const VIS_BUFFER_SIZE: usize = 2048;

/// Piano layout on the home row: `a` is the base note, `k` its octave.
const NOTE_KEYS: [char; 13] = ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'];
const DEFAULT_BASE_NOTE: u8 = 60;
const VELOCITY: u8 = 100;
const PAN_STEP: f32 = 0.1;
/// Envelope times move geometrically so both 10 ms and 5 s are reachable.
const DURATION_STEP: f32 = 1.25;

pub struct UiApp {
    handle: VoiceHandle,
    audio_rx: Consumer<StereoFrame>,
    status_rx: Consumer<VoiceStatus>,
    status: VoiceStatus,
    left: Vec<f32>,
    right: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    sample_rate: f32,
    /// Position in `ControlId::ALL`
    selected: usize,
    base_note: u8,
    held: Option<u8>,
    last_error: Option<String>,
    key_release: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: VoiceHandle,
        audio_rx: Consumer<StereoFrame>,
        status_rx: Consumer<VoiceStatus>,
        sample_rate: f32,
    ) -> Self {
        Self {
            handle,
            audio_rx,
            status_rx,
            status: VoiceStatus::default(),
            left: vec![0.0; VIS_BUFFER_SIZE],
            right: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            sample_rate,
            selected: 0,
            base_note: DEFAULT_BASE_NOTE,
            held: None,
            last_error: None,
            key_release: false,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        // Without release events a key press latches the note until another
        // key or Backspace.
        if matches!(supports_keyboard_enhancement(), Ok(true)) {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.key_release = true;
        }

        let result = self.event_loop(terminal);

        if self.key_release {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_status();
            self.spectrum.update(&self.left);

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    match key.kind {
                        KeyEventKind::Press => self.handle_press(key.code),
                        KeyEventKind::Release => self.handle_release(key.code),
                        KeyEventKind::Repeat => {}
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }

        for _ in 0..available {
            let Ok(frame) = self.audio_rx.pop() else {
                break;
            };
            self.left.push(frame.left);
            self.right.push(frame.right);
        }
        for channel in [&mut self.left, &mut self.right] {
            if channel.len() > VIS_BUFFER_SIZE {
                let excess = channel.len() - VIS_BUFFER_SIZE;
                channel.drain(0..excess);
            }
        }
    }

    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn key_note(&self, key: KeyCode) -> Option<u8> {
        let KeyCode::Char(c) = key else {
            return None;
        };
        let offset = NOTE_KEYS.iter().position(|&k| k == c.to_ascii_lowercase())?;
        let note = self.base_note as usize + offset;
        u8::try_from(note).ok().filter(|&n| n <= 127)
    }

    fn handle_press(&mut self, key: KeyCode) {
        if let Some(note) = self.key_note(key) {
            let result = self.handle.note_on(note, VELOCITY);
            if self.report(result) {
                self.held = Some(note);
            }
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                let result = if self.status.is_playing {
                    self.handle.stop()
                } else {
                    self.handle.play()
                };
                self.report(result);
            }
            KeyCode::Backspace => {
                let result = self.handle.all_notes_off();
                self.report(result);
                self.held = None;
            }
            KeyCode::Char('z') => self.base_note = self.base_note.saturating_sub(12),
            KeyCode::Char('x') => {
                if self.base_note as usize + 12 + NOTE_KEYS.len() - 1 <= 127 {
                    self.base_note += 12;
                }
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(ControlId::ALL.len() - 1),
            KeyCode::Left => self.nudge_selected(false),
            KeyCode::Right => self.nudge_selected(true),
            KeyCode::Char('[') => self.nudge_pan(-PAN_STEP),
            KeyCode::Char(']') => self.nudge_pan(PAN_STEP),
            _ => {}
        }
    }

    fn handle_release(&mut self, key: KeyCode) {
        if let Some(note) = self.key_note(key) {
            if self.held == Some(note) {
                let result = self.handle.note_off(note);
                self.report(result);
                self.held = None;
            }
        }
    }

    fn nudge_selected(&mut self, up: bool) {
        let id = ControlId::ALL[self.selected];
        let current = self.handle.control_value(id);
        let range = id.range();

        let next = match (id, id.resolution()) {
            (
                ControlId::Envelope(EnvelopeParam::Attack | EnvelopeParam::Decay | EnvelopeParam::Release),
                _,
            ) => {
                let scaled = if up {
                    current * DURATION_STEP
                } else {
                    current / DURATION_STEP
                };
                scaled.clamp(0.001, range.max)
            }
            (_, Resolution::Integer) => {
                let step = if up { 1.0 } else { -1.0 };
                (current + step).clamp(range.min, range.max)
            }
            (_, Resolution::Continuous) => {
                let step = (range.max - range.min) / 100.0;
                let step = if up { step } else { -step };
                (current + step).clamp(range.min, range.max)
            }
        };

        let result = self.handle.set_control(id, next);
        self.report(result);
    }

    fn nudge_pan(&mut self, delta: f32) {
        let next = (self.handle.pan() + delta).clamp(PAN_RANGE.min, PAN_RANGE.max);
        let result = self.handle.set_pan(next);
        self.report(result);
    }

    /// Surface an error in the help bar; returns whether `result` was Ok.
    fn report(&mut self, result: fm_voice::Result<()>) -> bool {
        match result {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(err) => {
                warn!(%err, "ui action failed");
                self.last_error = Some(err.to_string());
                false
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(10),   // Controls | scopes
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.left);
        render_status(
            frame,
            rows[0],
            &self.status,
            self.handle.pan(),
            self.base_note,
            self.sample_rate,
            &stats,
        );

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(20)])
            .split(rows[1]);

        let groups = group_controls(&self.handle.describe_controls());
        render_controls(frame, body[0], &groups, ControlId::ALL[self.selected]);

        let scopes = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body[1]);
        render_waveform(
            frame,
            scopes[0],
            &self.left,
            &self.right,
            self.status.envelope_level,
        );
        render_spectrum(frame, scopes[1], &self.spectrum);

        let (text, color) = match &self.last_error {
            Some(err) => (format!(" {err}"), Color::Red),
            None => (
                " [a-k] Play  [z/x] Octave  [↑/↓] Select  [←/→] Adjust  [ [ ] ] Pan  [Space] Play/Stop  [Bksp] Release  [Q] Quit"
                    .to_string(),
                Color::DarkGray,
            ),
        };
        frame.render_widget(Paragraph::new(text).style(Style::default().fg(color)), rows[2]);
    }
}
