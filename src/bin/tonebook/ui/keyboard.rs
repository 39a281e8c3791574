//! Piano keyboard widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

use tonebook::{
    keyboard::{KeyRect, KeyState, Keyboard},
    playback::InstrumentPlayer,
    theory::PitchClass,
};

const MAX_WHITE_WIDTH: f32 = 4.0;

/// Render the keyboard, refitting it to the area first.
///
/// Returns the inner area; layout units are terminal cells from its
/// top-left corner.
pub fn render_keyboard(
    frame: &mut Frame,
    area: Rect,
    keyboard: &mut Keyboard,
    player: &InstrumentPlayer,
) -> Rect {
    let block = Block::default()
        .title(format!(" {} {} ", player.instrument().name, keyboard.range()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return inner;
    }

    let white_count = keyboard.layout().white_keys().len().max(1) as f32;
    let white_width = (inner.width as f32 / white_count).clamp(1.0, MAX_WHITE_WIDTH);
    let black_width = (white_width * 0.6).max(1.0);
    let height = inner.height as f32;
    let layout = keyboard.layout();
    if layout.white_width() != white_width || layout.height() != height {
        keyboard.resize(white_width, black_width, height);
    }

    let layout = keyboard.layout();
    for key in layout.white_keys() {
        draw_key(frame, inner, key, keyboard.key_state(&key.note, player));
    }
    for key in layout.black_keys() {
        draw_key(frame, inner, key, keyboard.key_state(&key.note, player));
    }

    inner
}

fn draw_key(frame: &mut Frame, inner: Rect, key: &KeyRect, state: KeyState) {
    let x0 = key.x.max(0.0).floor() as u16;
    let x1 = (key.right().floor() as u16).max(x0 + 1);
    if x0 >= inner.width {
        return;
    }
    let width = x1.min(inner.width) - x0;
    let height = (key.height.round() as u16).clamp(1, inner.height);
    let rect = Rect::new(inner.x + x0, inner.y, width, height);

    let bg = match (key.is_black, state) {
        (_, KeyState::Highlighted) => Color::Yellow,
        (_, KeyState::Active) => Color::LightBlue,
        (false, KeyState::Unavailable) => Color::Gray,
        (true, KeyState::Unavailable) => Color::DarkGray,
        (false, KeyState::Normal) => Color::White,
        (true, KeyState::Normal) => Color::Black,
    };

    let buf = frame.buffer_mut();
    buf.set_style(rect, Style::default().bg(bg).fg(Color::Black));

    if !key.is_black {
        // Edge between neighbouring white keys
        if width >= 2 {
            for y in rect.y..rect.y + rect.height {
                buf.set_string(rect.x + width - 1, y, "▕", Style::default().fg(Color::DarkGray).bg(bg));
            }
        }
        if key.note.pitch_class == PitchClass::C && width >= 2 {
            let label = key.note.to_string();
            let label: String = label.chars().take(width as usize).collect();
            buf.set_string(rect.x, rect.y + rect.height - 1, label, Style::default().fg(Color::Black).bg(bg));
        }
    }
}
