#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/*
Note Identifiers
================

A note identifier names one key on the keyboard: a pitch class plus an
octave number, e.g. "C#4". Pitch classes are always spelled with sharps.

  C  C#  D  D#  E  F  F#  G  G#  A  A#  B
  0  1   2  3   4  5  6   7  8   9  10  11   (semitone within the octave)

MIDI numbering puts middle C (C4) at 60:

  midi = 12 * (octave + 1) + semitone

Sample files cannot carry a '#' in every URL, so sharps are spelled with
a literal "s" on disk: D#4 lives in "Ds4.mp3".
*/

/// Errors produced while reading a note identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("invalid note identifier '{0}', expected [A-G](#)?<octave>")]
    InvalidFormat(String),
    #[error("MIDI note {0} has no note identifier")]
    OutOfRange(i32),
}

/// One of the twelve chromatic pitch classes, spelled with sharps.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order, starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Position within the octave (C = 0, B = 11)
    pub fn semitone(self) -> u8 {
        self as u8
    }

    /// Pitch class for a semitone offset; wraps around the octave.
    pub fn from_semitone(semitone: u8) -> Self {
        Self::ALL[(semitone % 12) as usize]
    }

    pub fn is_sharp(self) -> bool {
        matches!(
            self,
            PitchClass::CSharp
                | PitchClass::DSharp
                | PitchClass::FSharp
                | PitchClass::GSharp
                | PitchClass::ASharp
        )
    }

    /// Display name, e.g. "F#"
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Spelling used in sample file names, e.g. "Fs"
    pub fn file_name(self) -> &'static str {
        match self {
            PitchClass::CSharp => "Cs",
            PitchClass::DSharp => "Ds",
            PitchClass::FSharp => "Fs",
            PitchClass::GSharp => "Gs",
            PitchClass::ASharp => "As",
            natural => natural.name(),
        }
    }

    fn natural(letter: char) -> Option<Self> {
        match letter {
            'C' => Some(PitchClass::C),
            'D' => Some(PitchClass::D),
            'E' => Some(PitchClass::E),
            'F' => Some(PitchClass::F),
            'G' => Some(PitchClass::G),
            'A' => Some(PitchClass::A),
            'B' => Some(PitchClass::B),
            _ => None,
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pitch class in a specific octave, e.g. "C#4".
///
/// Ordering follows pitch height: octave first, then chromatic position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId {
    pub octave: u8,
    pub pitch_class: PitchClass,
}

impl NoteId {
    pub const fn new(pitch_class: PitchClass, octave: u8) -> Self {
        Self {
            octave,
            pitch_class,
        }
    }

    /// MIDI note number (C4 = 60)
    pub fn midi(&self) -> i32 {
        12 * (self.octave as i32 + 1) + self.pitch_class.semitone() as i32
    }

    /// Inverse of [`NoteId::midi`]. Octave -1 (MIDI 0-11) has no identifier.
    pub fn from_midi(midi: i32) -> Result<Self, NoteError> {
        if !(12..=12 * 256 + 11).contains(&midi) {
            return Err(NoteError::OutOfRange(midi));
        }
        let octave = (midi / 12 - 1) as u8;
        let pitch_class = PitchClass::from_semitone((midi % 12) as u8);
        Ok(Self::new(pitch_class, octave))
    }

    pub fn is_sharp(&self) -> bool {
        self.pitch_class.is_sharp()
    }

    /// File stem for sample assets, e.g. "Ds4" for D#4
    pub fn file_stem(&self) -> String {
        format!("{}{}", self.pitch_class.file_name(), self.octave)
    }

    /// Move by a number of semitones.
    pub fn transpose(&self, semitones: i32) -> Result<Self, NoteError> {
        Self::from_midi(self.midi() + semitones)
    }

    /// Lenient reader for file names and user text.
    ///
    /// Accepts everything [`FromStr`] does plus flats ("Db4") and the
    /// sample-file spelling ("Ds4"). The result is always sharp-spelled.
    pub fn parse_loose(text: &str) -> Result<Self, NoteError> {
        let invalid = || NoteError::InvalidFormat(text.to_string());
        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let natural = PitchClass::natural(letter.to_ascii_uppercase()).ok_or_else(invalid)?;

        let rest = chars.as_str();
        let (shift, digits) = match rest.chars().next() {
            Some('#') | Some('s') => (1, &rest[1..]),
            Some('b') => (-1, &rest[1..]),
            _ => (0, rest),
        };
        let octave = parse_octave(digits).ok_or_else(invalid)?;

        let natural = NoteId::new(natural, octave);
        natural.transpose(shift).map_err(|_| invalid())
    }
}

fn parse_octave(digits: &str) -> Option<u8> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for NoteId {
    type Err = NoteError;

    /// Strict reader: `[A-G](#)?\d+`
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || NoteError::InvalidFormat(text.to_string());
        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let natural = PitchClass::natural(letter).ok_or_else(invalid)?;

        let rest = chars.as_str();
        let (sharp, digits) = match rest.strip_prefix('#') {
            Some(digits) => (true, digits),
            None => (false, rest),
        };
        let octave = parse_octave(digits).ok_or_else(invalid)?;

        // E# and B# are not in the sharp-spelled set
        let pitch_class = if sharp {
            match natural {
                PitchClass::E | PitchClass::B => return Err(invalid()),
                other => PitchClass::from_semitone(other.semitone() + 1),
            }
        } else {
            natural
        };

        Ok(NoteId::new(pitch_class, octave))
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

/// Split a note identifier into pitch class and octave.
pub fn parse_note(text: &str) -> Result<(PitchClass, u8), NoteError> {
    let note: NoteId = text.parse()?;
    Ok((note.pitch_class, note.octave))
}

/// Every note from `min_octave` to `max_octave` inclusive, ascending.
///
/// Returns an empty list when `min_octave > max_octave`.
pub fn generate_notes(min_octave: u8, max_octave: u8) -> Vec<NoteId> {
    if min_octave > max_octave {
        return Vec::new();
    }
    let octaves = (max_octave - min_octave) as usize + 1;
    let mut notes = Vec::with_capacity(octaves * 12);
    for octave in min_octave..=max_octave {
        notes.extend(PitchClass::ALL.iter().map(|&pc| NoteId::new(pc, octave)));
    }
    notes
}
