//! Stereo scope with the envelope level drawn as a ±bound

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Plot `left` and `right` over the same time axis. Centre pan keeps both
/// traces inside `±envelope_level × 0.707`; hard pan pushes one of them out
/// to the full envelope.
pub fn render_waveform(
    frame: &mut Frame,
    area: Rect,
    left: &[f32],
    right: &[f32],
    envelope_level: f32,
) {
    let left_points = points(left);
    let right_points = points(right);
    let level = envelope_level as f64;
    let upper = [(0.0, level), (1.0, level)];
    let lower = [(0.0, -level), (1.0, -level)];

    let datasets = vec![
        trace(&upper, Color::Yellow).name("env"),
        trace(&lower, Color::Yellow),
        trace(&left_points, Color::Cyan).name("L"),
        trace(&right_points, Color::Magenta).name("R"),
    ];

    let title = Line::from(format!(" Output  env {envelope_level:.2} "));
    let chart = Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

fn trace(data: &[(f64, f64)], color: Color) -> Dataset<'_> {
    Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data)
}

fn points(samples: &[f32]) -> Vec<(f64, f64)> {
    let len = samples.len().max(1) as f64;
    samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / len, sample as f64))
        .collect()
}
