//! Keyboard view model.
//!
//! Holds no musical logic beyond key geometry. Pointer events are turned
//! into note ids, forwarded to a [`NotePlayer`] and reported to the owner
//! through a callback.

pub mod layout;

use std::collections::BTreeSet;

use tracing::trace;

pub use layout::{KeyRect, KeyboardLayout};

use crate::instrument::range::OctaveRange;
use crate::playback::NotePlayer;
use crate::theory::note::NoteId;

/// How a key should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Normal,
    /// Selected by the owner, e.g. the notes of an interval
    Active,
    /// Currently sounding
    Highlighted,
    /// The instrument has no sample for it
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct Keyboard {
    layout: KeyboardLayout,
    active: BTreeSet<NoteId>,
    highlighted: BTreeSet<NoteId>,
    pressed: Option<NoteId>,
}

impl Keyboard {
    pub fn new(layout: KeyboardLayout) -> Self {
        Self {
            layout,
            active: BTreeSet::new(),
            highlighted: BTreeSet::new(),
            pressed: None,
        }
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn range(&self) -> OctaveRange {
        self.layout.range()
    }

    /// Switch to another octave range, keeping key sizes.
    ///
    /// Selections outside the new range are dropped.
    pub fn set_range(&mut self, range: OctaveRange) {
        self.layout = KeyboardLayout::with_height(
            range,
            self.layout.white_width(),
            self.layout.black_width(),
            self.layout.height(),
        );
        self.active.retain(|note| range.contains_note(note));
        self.highlighted.retain(|note| range.contains_note(note));
        if self.pressed.is_some_and(|note| !range.contains_note(&note)) {
            self.pressed = None;
        }
    }

    /// Rebuild key geometry for a new drawing area.
    pub fn resize(&mut self, white_width: f32, black_width: f32, height: f32) {
        self.layout = KeyboardLayout::with_height(self.range(), white_width, black_width, height);
    }

    pub fn set_active<I: IntoIterator<Item = NoteId>>(&mut self, notes: I) {
        self.active = notes.into_iter().collect();
    }

    pub fn toggle_active(&mut self, note: NoteId) {
        if !self.active.remove(&note) {
            self.active.insert(note);
        }
    }

    pub fn clear_active(&mut self) {
        self.active.clear();
    }

    pub fn active(&self) -> &BTreeSet<NoteId> {
        &self.active
    }

    pub fn highlighted(&self) -> &BTreeSet<NoteId> {
        &self.highlighted
    }

    pub fn set_highlighted<I: IntoIterator<Item = NoteId>>(&mut self, notes: I) {
        self.highlighted = notes.into_iter().collect();
    }

    pub fn pressed(&self) -> Option<NoteId> {
        self.pressed
    }

    /// Pointer pressed at (x, y). Returns the note under it, if any.
    pub fn pointer_down<F>(
        &mut self,
        x: f32,
        y: f32,
        player: &mut dyn NotePlayer,
        on_note: F,
    ) -> Option<NoteId>
    where
        F: FnMut(&NoteId),
    {
        let note = self.layout.key_at(x, y)?;
        self.press(note, player, on_note);
        Some(note)
    }

    /// Press a key by note id (computer keyboard input).
    ///
    /// Returns false when the note is outside the keyboard.
    pub fn press<F>(&mut self, note: NoteId, player: &mut dyn NotePlayer, mut on_note: F) -> bool
    where
        F: FnMut(&NoteId),
    {
        if !self.range().contains_note(&note) {
            return false;
        }

        if let Some(previous) = self.pressed.take() {
            self.release(previous, player);
        }

        if player.is_note_available(&note) {
            player.play_note(&note);
        } else {
            trace!(%note, "no sample for key");
        }
        self.pressed = Some(note);
        self.highlighted.insert(note);
        on_note(&note);
        true
    }

    /// Pointer released. Stops the pressed note, if any.
    pub fn pointer_up(&mut self, player: &mut dyn NotePlayer) -> Option<NoteId> {
        let note = self.pressed.take()?;
        self.release(note, player);
        Some(note)
    }

    /// Mirror what the player is still sounding, e.g. after notes ran
    /// out on their own.
    pub fn sync(&mut self, player: &dyn NotePlayer) {
        self.highlighted = player.sounding_notes().into_iter().collect();
        self.highlighted.retain(|note| self.layout.range().contains_note(note));
        if let Some(pressed) = self.pressed {
            self.highlighted.insert(pressed);
        }
    }

    pub fn key_state(&self, note: &NoteId, player: &dyn NotePlayer) -> KeyState {
        if self.highlighted.contains(note) {
            KeyState::Highlighted
        } else if self.active.contains(note) {
            KeyState::Active
        } else if !player.is_note_available(note) {
            KeyState::Unavailable
        } else {
            KeyState::Normal
        }
    }

    fn release(&mut self, note: NoteId, player: &mut dyn NotePlayer) {
        player.stop_note(&note);
        self.highlighted.remove(&note);
    }
}
