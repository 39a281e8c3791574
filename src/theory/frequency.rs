//! Frequency ↔ note conversion for the frequency explorer.
//!
//! Equal temperament around A4 = 440 Hz:
//!   f = 440 * 2^((midi - 69) / 12)
//!   midi = 69 + round(12 * log2(f / 440))

use thiserror::Error;

use super::note::NoteId;

/// Concert pitch reference
pub const A4_FREQUENCY: f64 = 440.0;
const A4_MIDI: i32 = 69;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrequencyError {
    #[error("frequency must be a positive number of hertz, got {0}")]
    NotPositive(f64),
    #[error("{0} Hz is outside the named note range")]
    OutOfRange(f64),
}

/// Frequency of a note in Hz.
pub fn note_frequency(note: &NoteId) -> f64 {
    midi_to_frequency(note.midi())
}

pub fn midi_to_frequency(midi: i32) -> f64 {
    A4_FREQUENCY * 2.0_f64.powf((midi - A4_MIDI) as f64 / 12.0)
}

/// Nearest note to a frequency.
pub fn note_from_frequency(frequency: f64) -> Result<NoteId, FrequencyError> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(FrequencyError::NotPositive(frequency));
    }
    let steps = (12.0 * (frequency / A4_FREQUENCY).log2()).round();
    if steps.abs() > 4096.0 {
        return Err(FrequencyError::OutOfRange(frequency));
    }
    NoteId::from_midi(A4_MIDI + steps as i32).map_err(|_| FrequencyError::OutOfRange(frequency))
}

/// How far a frequency sits from the nearest note, in cents (-50..=50).
pub fn cents_offset(frequency: f64) -> Result<f64, FrequencyError> {
    let note = note_from_frequency(frequency)?;
    Ok(1200.0 * (frequency / note_frequency(&note)).log2())
}
