//! Control panel widget - one section per oscillator plus the envelope

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use fm_voice::control::{ControlGroup, ControlId, Resolution};

/// Render every control group, highlighting `selected`.
pub fn render_controls(frame: &mut Frame, area: Rect, groups: &[ControlGroup], selected: ControlId) {
    let block = Block::default().title(" Controls ").borders(Borders::ALL);

    let mut lines = Vec::new();
    for group in groups {
        lines.push(Line::from(Span::styled(
            group.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));

        for entry in &group.controls {
            let descriptor = &entry.descriptor;
            let value = match descriptor.resolution {
                Resolution::Integer => format!("{:>6.0}", descriptor.value),
                Resolution::Continuous => format!("{:>6.2}", descriptor.value),
            };
            let text = format!(
                "  {:<11}{}  [{} .. {}]",
                descriptor.name, value, descriptor.range.min, descriptor.range.max
            );

            let style = if entry.id == selected {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(text, style)));
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
