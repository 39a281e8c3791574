use std::fmt;

use super::note::NoteId;

/// Interval quality as taught in the interval explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Perfect,
    Major,
    Minor,
    /// The tritone, spelled as an augmented fourth
    Augmented,
}

/// A simple interval (within one octave), measured in semitones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    semitones: u8,
}

impl Interval {
    pub const UNISON: Interval = Interval { semitones: 0 };
    pub const PERFECT_FIFTH: Interval = Interval { semitones: 7 };
    pub const OCTAVE_SEMITONES: u8 = 12;

    /// Wraps into the octave, so 12 becomes unison.
    pub fn from_semitones(semitones: u8) -> Self {
        Self {
            semitones: semitones % Self::OCTAVE_SEMITONES,
        }
    }

    pub fn semitones(&self) -> u8 {
        self.semitones
    }

    pub fn name(&self) -> &'static str {
        match self.semitones {
            0 => "Unison",
            1 => "Minor Second",
            2 => "Major Second",
            3 => "Minor Third",
            4 => "Major Third",
            5 => "Perfect Fourth",
            6 => "Tritone",
            7 => "Perfect Fifth",
            8 => "Minor Sixth",
            9 => "Major Sixth",
            10 => "Minor Seventh",
            _ => "Major Seventh",
        }
    }

    /// Short label, e.g. "m3" or "P5"
    pub fn short_name(&self) -> &'static str {
        match self.semitones {
            0 => "P1",
            1 => "m2",
            2 => "M2",
            3 => "m3",
            4 => "M3",
            5 => "P4",
            6 => "A4",
            7 => "P5",
            8 => "m6",
            9 => "M6",
            10 => "m7",
            _ => "M7",
        }
    }

    pub fn quality(&self) -> Quality {
        match self.semitones {
            0 | 5 | 7 => Quality::Perfect,
            1 | 3 | 8 | 10 => Quality::Minor,
            6 => Quality::Augmented,
            _ => Quality::Major,
        }
    }

    /// Intervals that sound stable (unison, thirds, fifths, sixths)
    pub fn is_consonant(&self) -> bool {
        matches!(self.semitones, 0 | 3 | 4 | 5 | 7 | 8 | 9)
    }

    /// Interval that completes this one to an octave (M3 ↔ m6).
    pub fn inversion(&self) -> Self {
        Self::from_semitones(Self::OCTAVE_SEMITONES - self.semitones)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semitone distance between two notes, folded into one octave.
///
/// Symmetric in its arguments; always within `0..=11`.
pub fn calculate_interval(a: &NoteId, b: &NoteId) -> u8 {
    ((a.midi() - b.midi()).unsigned_abs() % Interval::OCTAVE_SEMITONES as u32) as u8
}

/// Interval between two notes plus how many whole octaves separate them.
pub fn compound_interval(a: &NoteId, b: &NoteId) -> (Interval, u32) {
    let distance = (a.midi() - b.midi()).unsigned_abs();
    let octaves = distance / Interval::OCTAVE_SEMITONES as u32;
    (Interval::from_semitones(calculate_interval(a, b)), octaves)
}
