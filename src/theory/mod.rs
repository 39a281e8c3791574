//! Pure music-theory helpers shared by every widget.
//!
//! Nothing in here allocates audio or keeps state between calls.

/// Frequency ↔ note conversion.
pub mod frequency;
/// Interval distances, names and qualities.
pub mod interval;
/// Note identifiers ("C#4") and octave enumeration.
pub mod note;
/// Meters, accent patterns and pulse timing.
pub mod time_signature;

pub use frequency::{cents_offset, note_frequency, note_from_frequency, FrequencyError};
pub use interval::{calculate_interval, compound_interval, Interval, Quality};
pub use note::{generate_notes, parse_note, NoteError, NoteId, PitchClass};
pub use time_signature::{Accent, TimeSignature};
