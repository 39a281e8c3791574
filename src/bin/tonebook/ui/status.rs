//! Status bar widget - instrument, load state, last note, notices and audio levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tonebook::{
    playback::{InstrumentPlayer, LoadState},
    theory::NoteId,
};

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

/// Render the status bar
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    player: &InstrumentPlayer,
    base_octave: u8,
    last_note: Option<NoteId>,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" tonebook ").borders(Borders::ALL);

    let (state_str, state_color) = match player.state() {
        LoadState::Unloaded => ("○ idle", Color::DarkGray),
        LoadState::Loading => ("◌ loading", Color::Yellow),
        LoadState::Ready => ("● ready", Color::Green),
        LoadState::Error => ("✕ error", Color::Red),
        LoadState::Degraded => ("◐ no samples", Color::Yellow),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {}  ", player.instrument().name),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{state_str}  "), Style::default().fg(state_color)),
        Span::styled(
            format!("Octave {base_octave}  "),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "Last: {}  ",
                last_note.map_or_else(|| "-".to_string(), |n| n.to_string())
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}  ", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ];

    if let Some(notice) = player.notice() {
        spans.push(Span::styled(
            format!("⚠ {}", notice.message),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
