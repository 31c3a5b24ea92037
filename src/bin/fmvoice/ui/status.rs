//! Status bar widget - shows transport, note, envelope and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use fm_voice::dsp::EnvelopeState;

use super::VoiceStatus;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

fn stage_name(state: EnvelopeState) -> &'static str {
    match state {
        EnvelopeState::Idle => "idle",
        EnvelopeState::Attack => "attack",
        EnvelopeState::Decay => "decay",
        EnvelopeState::Sustain => "sustain",
        EnvelopeState::Release => "release",
    }
}

/// Render the status bar
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    status: &VoiceStatus,
    pan: f32,
    octave_base: u8,
    sample_rate: f32,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" fmvoice ").borders(Borders::ALL);

    let play_symbol = if status.is_playing { "▶" } else { "⏸" };
    let play_state_str = if status.is_playing { "Playing" } else { "Stopped" };
    let note = status.note.map_or_else(|| "--".to_string(), note_name);

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", play_symbol, play_state_str),
            Style::default().fg(if status.is_playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("Note: {:<4} Keys from {}  ", note, note_name(octave_base)),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Carrier: {:>8.1} Hz  ", status.carrier_frequency),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "Env: {:<7} {:.2}  ",
                stage_name(status.envelope_state),
                status.envelope_level
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("Pan: {:+.2}  ", pan), Style::default().fg(Color::White)),
        Span::styled(
            format!("{:.1}kHz  ", sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
