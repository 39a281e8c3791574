//! Key geometry for a piano keyboard spanning an octave range.
//!
//! Units are whatever the renderer uses (terminal cells, pixels). White
//! keys sit edge to edge from x = 0; each black key straddles the boundary
//! after the white key that precedes it:
//!
//!   black_x = preceding_white_count × white_width − black_width / 2
//!
//! Black keys are shorter and drawn on top, so hit testing checks them
//! first.

use crate::instrument::range::OctaveRange;
use crate::theory::note::NoteId;

/// Black keys reach this fraction of the white key height
const BLACK_KEY_HEIGHT_RATIO: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyRect {
    pub note: NoteId,
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub is_black: bool,
}

impl KeyRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= 0.0 && y < self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    range: OctaveRange,
    white_width: f32,
    black_width: f32,
    height: f32,
    white: Vec<KeyRect>,
    black: Vec<KeyRect>,
}

impl KeyboardLayout {
    pub fn new(range: OctaveRange, white_width: f32, black_width: f32) -> Self {
        Self::with_height(range, white_width, black_width, 1.0)
    }

    pub fn with_height(range: OctaveRange, white_width: f32, black_width: f32, height: f32) -> Self {
        let white_width = white_width.max(f32::EPSILON);
        let black_width = black_width.clamp(0.0, white_width);
        let height = height.max(f32::EPSILON);

        let mut white = Vec::new();
        let mut black = Vec::new();
        for note in range.notes() {
            if note.is_sharp() {
                let preceding = white.len() as f32;
                black.push(KeyRect {
                    note,
                    x: preceding * white_width - black_width / 2.0,
                    width: black_width,
                    height: height * BLACK_KEY_HEIGHT_RATIO,
                    is_black: true,
                });
            } else {
                white.push(KeyRect {
                    note,
                    x: white.len() as f32 * white_width,
                    width: white_width,
                    height,
                    is_black: false,
                });
            }
        }

        Self {
            range,
            white_width,
            black_width,
            height,
            white,
            black,
        }
    }

    pub fn range(&self) -> OctaveRange {
        self.range
    }

    pub fn white_keys(&self) -> &[KeyRect] {
        &self.white
    }

    pub fn black_keys(&self) -> &[KeyRect] {
        &self.black
    }

    pub fn white_width(&self) -> f32 {
        self.white_width
    }

    pub fn black_width(&self) -> f32 {
        self.black_width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Total width of the keyboard
    pub fn width(&self) -> f32 {
        self.white.len() as f32 * self.white_width
    }

    pub fn key(&self, note: &NoteId) -> Option<&KeyRect> {
        self.black
            .iter()
            .chain(self.white.iter())
            .find(|key| key.note == *note)
    }

    /// Key under a pointer position; black keys win where they overlap.
    pub fn key_at(&self, x: f32, y: f32) -> Option<NoteId> {
        self.black
            .iter()
            .find(|key| key.contains(x, y))
            .or_else(|| self.white.iter().find(|key| key.contains(x, y)))
            .map(|key| key.note)
    }
}
