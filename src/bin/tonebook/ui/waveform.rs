//! Waveform oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Quieter signals are zoomed in, but never past this range
const MIN_SCALE: f64 = 0.1;

/// Render `samples` as an oscilloscope trace, scaled to their peak.
pub fn render_waveform(frame: &mut Frame, area: Rect, title: &str, samples: &[f32]) {
    let peak = samples.iter().fold(0.0_f32, |p, s| p.max(s.abs())) as f64;
    let scale = peak.clamp(MIN_SCALE, 1.0);

    let title = if peak > 0.0 {
        format!("{title} peak {peak:.2} ")
    } else {
        title.to_string()
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let step = 1.0 / samples.len().max(1) as f64;
    let trace: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 * step, sample as f64))
        .collect();
    let zero = [(0.0, 0.0), (1.0, 0.0)];

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&zero),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&trace),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(Axis::default().bounds([0.0, 1.0]))
        .y_axis(Axis::default().bounds([-scale, scale]));

    frame.render_widget(chart, area);
}
