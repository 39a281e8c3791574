#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::theory::note::{generate_notes, NoteId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid octave range {min}-{max}: min must not exceed max")]
pub struct RangeError {
    pub min: u8,
    pub max: u8,
}

/// Inclusive span of octaves, `min <= max`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OctaveRange {
    min: u8,
    max: u8,
}

impl OctaveRange {
    /// Used when an instrument is unknown
    pub const DEFAULT: OctaveRange = OctaveRange { min: 3, max: 5 };

    pub fn new(min: u8, max: u8) -> Result<Self, RangeError> {
        if min > max {
            return Err(RangeError { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn octave_count(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    pub fn octaves(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }

    pub fn contains(&self, octave: u8) -> bool {
        self.octaves().contains(&octave)
    }

    pub fn contains_note(&self, note: &NoteId) -> bool {
        self.contains(note.octave)
    }

    /// Narrow a requested range to what `bounds` allows.
    ///
    /// A request entirely outside the bounds collapses onto the nearest
    /// edge octave.
    pub fn clamp_to(&self, bounds: &OctaveRange) -> OctaveRange {
        let min = self.min.clamp(bounds.min, bounds.max);
        let max = self.max.clamp(bounds.min, bounds.max);
        OctaveRange { min, max }
    }

    /// Every note in the range, ascending.
    pub fn notes(&self) -> Vec<NoteId> {
        generate_notes(self.min, self.max)
    }
}

impl Default for OctaveRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for OctaveRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}
