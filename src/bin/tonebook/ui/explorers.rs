//! Explorer panel - text view of whichever explorer is selected

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use tonebook::{explorer::WidgetState, theory::Accent};

use super::{Explorers, Panel};

pub fn render_panel(frame: &mut Frame, area: Rect, panel: Panel, title: &str, explorers: &Explorers) {
    let block = Block::default().title(title).borders(Borders::ALL);

    let lines = match panel {
        Panel::Interval => interval_lines(explorers),
        Panel::Metronome => metronome_lines(explorers),
        Panel::Frequency => frequency_lines(explorers),
        Panel::Waveform => waveform_lines(explorers),
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn state_line(state: WidgetState) -> Line<'static> {
    match state {
        WidgetState::Idle => Line::styled("⏸ idle", Style::default().fg(Color::DarkGray)),
        WidgetState::Playing => Line::styled("▶ playing", Style::default().fg(Color::Green)),
    }
}

fn label(text: &str) -> Span<'static> {
    Span::styled(format!("{text:<10}"), Style::default().fg(Color::DarkGray))
}

fn interval_lines(explorers: &Explorers) -> Vec<Line<'static>> {
    let explorer = &explorers.interval;
    let interval = explorer.interval();
    vec![
        state_line(explorer.state()),
        Line::from(vec![
            label("Notes"),
            Span::raw(format!("{} → {}", explorer.lower(), explorer.upper())),
        ]),
        Line::from(vec![
            label("Interval"),
            Span::styled(interval.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" ({})", interval.short_name())),
        ]),
        Line::from(vec![
            label("Semitones"),
            Span::raw(format!("{} (+{} oct)", interval.semitones(), explorer.octaves())),
        ]),
        Line::from(vec![
            label("Sound"),
            Span::raw(if interval.is_consonant() { "consonant" } else { "dissonant" }),
        ]),
        Line::from(vec![label("Inversion"), Span::raw(interval.inversion().to_string())]),
        Line::raw(""),
        Line::styled("[Space] play  [↑/↓] move upper note", Style::default().fg(Color::DarkGray)),
    ]
}

fn metronome_lines(explorers: &Explorers) -> Vec<Line<'static>> {
    let metronome = &explorers.metronome;
    let meter = metronome.time_signature();

    let beats: Vec<Span<'static>> = metronome
        .accents()
        .iter()
        .enumerate()
        .map(|(i, accent)| {
            let symbol = match accent {
                Accent::High => "●",
                Accent::Mid => "◉",
                Accent::Low => "○",
            };
            let lit = explorers
                .last_beat
                .is_some_and(|(beat, _)| beat as usize == i && metronome.state() == WidgetState::Playing);
            let style = if lit {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(format!("{symbol} "), style)
        })
        .collect();

    vec![
        state_line(metronome.state()),
        Line::from(vec![label("Tempo"), Span::raw(format!("{:.0} BPM", metronome.bpm()))]),
        Line::from(vec![
            label("Meter"),
            Span::styled(meter.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" ({})", meter.meter_name())),
        ]),
        Line::from(vec![label("Felt"), Span::raw(format!("{} beats per bar", meter.felt_beats_per_bar()))]),
        Line::from([vec![label("Accents")], beats].concat()),
        Line::raw(""),
        Line::styled("[Space] start/stop  [↑/↓] tempo  [M] meter", Style::default().fg(Color::DarkGray)),
    ]
}

fn frequency_lines(explorers: &Explorers) -> Vec<Line<'static>> {
    let explorer = &explorers.frequency;
    let reading = match explorer.reading() {
        Ok(reading) => {
            let tune = if reading.is_in_tune() {
                Span::styled(" in tune", Style::default().fg(Color::Green))
            } else {
                Span::styled(format!(" {:+.0} cents", reading.cents), Style::default().fg(Color::Yellow))
            };
            Line::from(vec![
                label("Nearest"),
                Span::styled(reading.note.to_string(), Style::default().add_modifier(Modifier::BOLD)),
                tune,
            ])
        }
        Err(e) => Line::styled(e.to_string(), Style::default().fg(Color::Red)),
    };

    vec![
        state_line(explorer.state()),
        Line::from(vec![label("Frequency"), Span::raw(format!("{:.2} Hz", explorer.frequency()))]),
        reading,
        Line::raw(""),
        Line::styled("[Space] play  [↑/↓] semitone  [V] waveform", Style::default().fg(Color::DarkGray)),
    ]
}

fn waveform_lines(explorers: &Explorers) -> Vec<Line<'static>> {
    let explorer = &explorers.waveform;
    let bars: Vec<Span<'static>> = explorer
        .harmonics(8)
        .into_iter()
        .map(|amp| {
            let level = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
            let idx = ((amp * (level.len() - 1) as f32).round() as usize).min(level.len() - 1);
            let c = if amp <= 0.0 { ' ' } else { level[idx] };
            Span::styled(format!("{c} "), Style::default().fg(Color::Cyan))
        })
        .collect();

    vec![
        state_line(explorer.state()),
        Line::from(vec![
            label("Waveform"),
            Span::styled(explorer.waveform().to_string(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![label("Frequency"), Span::raw(format!("{:.1} Hz", explorer.frequency()))]),
        Line::from([vec![label("Harmonics")], bars].concat()),
        Line::raw(""),
        Line::styled("[Space] play  [↑/↓] pitch  [V] waveform", Style::default().fg(Color::DarkGray)),
    ]
}
