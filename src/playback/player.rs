use crate::theory::note::NoteId;

/// Note-trigger capability handed to widgets by whoever owns the instrument.
///
/// Widgets never own playback; the container passes `&mut dyn NotePlayer`
/// down to the keyboard and explorers that need to make sound.
pub trait NotePlayer {
    /// Start a note. Ignored (and logged) when the instrument is not ready.
    fn play_note(&mut self, note: &NoteId);

    /// Start several notes one after another.
    ///
    /// They are not guaranteed to begin on the same audio sample.
    fn play_notes(&mut self, notes: &[NoteId]) {
        for note in notes {
            self.play_note(note);
        }
    }

    /// Release a note early. No-op when it is not sounding.
    fn stop_note(&mut self, note: &NoteId);

    /// Whether the loaded instrument declares this note playable.
    fn is_note_available(&self, note: &NoteId) -> bool;

    /// Notes currently sounding, ascending.
    fn sounding_notes(&self) -> Vec<NoteId>;
}
