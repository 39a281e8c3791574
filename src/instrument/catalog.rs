//! Fixed table of playable instruments.
//!
//! Each entry declares its playable octaves and which pitches were
//! actually recorded. Notes between recorded pitches are produced by
//! pitch-shifting the nearest sample (see [`InstrumentDescriptor::nearest_sample`]).

use tracing::warn;

use super::range::OctaveRange;
use crate::theory::note::{NoteId, PitchClass};

use PitchClass::*;

/// Static description of one sample-backed instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentDescriptor {
    pub name: &'static str,
    min_octave: u8,
    max_octave: u8,
    /// Pitch classes recorded in every octave of the range
    sampled: &'static [PitchClass],
    /// Octaves where every chromatic note is declared playable
    full_octaves: &'static [u8],
}

/// A recorded note and the shift needed to reach a requested pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleChoice {
    pub sample: NoteId,
    /// Requested minus recorded, in semitones
    pub shift: i32,
}

const fn entry(
    name: &'static str,
    min_octave: u8,
    max_octave: u8,
    sampled: &'static [PitchClass],
    full_octaves: &'static [u8],
) -> InstrumentDescriptor {
    InstrumentDescriptor {
        name,
        min_octave,
        max_octave,
        sampled,
        full_octaves,
    }
}

const CATALOG: &[InstrumentDescriptor] = &[
    entry("piano", 1, 7, &[C, DSharp, FSharp, A], &[1, 2, 3, 4, 5, 6, 7]),
    entry("cello", 2, 5, &[C, DSharp, FSharp, A], &[3, 4]),
    entry("violin", 3, 7, &[C, E, G, A], &[]),
    entry("flute", 4, 6, &[C, E, A], &[5]),
    entry("guitar-acoustic", 2, 5, &[C, D, E, FSharp, GSharp, ASharp], &[3]),
    entry("bass-electric", 1, 4, &[CSharp, E, G, ASharp], &[]),
    entry("contrabass", 1, 3, &[C, D, E, G, A], &[]),
    entry("trumpet", 3, 5, &[C, DSharp, F, A], &[4]),
    entry("saxophone", 3, 5, &[CSharp, DSharp, F, G, A], &[]),
    entry("clarinet", 3, 6, &[D, F, ASharp], &[]),
    entry("french-horn", 2, 5, &[C, DSharp, G, A], &[]),
    entry("harp", 1, 7, &[C, E, G, B], &[]),
    entry("xylophone", 4, 7, &[C, G], &[]),
];

/// Stand-in for names missing from the catalog: default range, no samples.
const UNKNOWN: InstrumentDescriptor = entry("unknown", 3, 5, &[], &[]);

/// Every instrument in the catalog, in display order.
pub fn instruments() -> &'static [InstrumentDescriptor] {
    CATALOG
}

/// Case-insensitive catalog lookup.
pub fn lookup(name: &str) -> Option<&'static InstrumentDescriptor> {
    let name = name.trim();
    CATALOG.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Lookup that never fails: unknown names log a warning and get the
/// default range with an empty sample set.
pub fn resolve(name: &str) -> &'static InstrumentDescriptor {
    lookup(name).unwrap_or_else(|| {
        warn!(instrument = name, "unknown instrument, using default octave range");
        &UNKNOWN
    })
}

/// Playable octave range for an instrument name.
pub fn octave_range(name: &str) -> OctaveRange {
    resolve(name).range()
}

impl InstrumentDescriptor {
    pub fn range(&self) -> OctaveRange {
        OctaveRange::new(self.min_octave, self.max_octave).unwrap_or_default()
    }

    pub fn is_known(&self) -> bool {
        lookup(self.name).is_some()
    }

    /// Recorded notes, ascending.
    pub fn sample_notes(&self) -> Vec<NoteId> {
        self.range()
            .octaves()
            .flat_map(|octave| self.sampled.iter().map(move |&pc| NoteId::new(pc, octave)))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whether the instrument can sound `note`.
    ///
    /// True when the note was recorded, or when its octave is declared
    /// fully playable.
    pub fn is_available(&self, note: &NoteId) -> bool {
        if !self.range().contains_note(note) {
            return false;
        }
        self.sampled.contains(&note.pitch_class) || self.full_octaves.contains(&note.octave)
    }

    /// Closest recorded pitch to `note`; ties go to the lower sample.
    pub fn nearest_sample(&self, note: &NoteId) -> Option<SampleChoice> {
        self.sample_notes()
            .into_iter()
            .min_by_key(|sample| ((note.midi() - sample.midi()).abs(), sample.midi()))
            .map(|sample| SampleChoice {
                sample,
                shift: note.midi() - sample.midi(),
            })
    }
}

/// Asset location for a recorded note: `<base_url>/<Stem>.mp3`.
pub fn sample_path(base_url: &str, note: &NoteId) -> String {
    let base = base_url.trim_end_matches('/');
    if base.is_empty() {
        format!("{}.mp3", note.file_stem())
    } else {
        format!("{base}/{}.mp3", note.file_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> NoteId {
        text.parse().unwrap()
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup("Cello").map(|d| d.name), Some("cello"));
        assert!(lookup("theremin").is_none());
    }

    #[test]
    fn unknown_instrument_falls_back_to_default_range() {
        let descriptor = resolve("theremin");
        assert!(!descriptor.is_known());
        assert_eq!(descriptor.range(), OctaveRange::DEFAULT);
        assert!(descriptor.sample_notes().is_empty());
        assert_eq!(octave_range("theremin"), OctaveRange::new(3, 5).unwrap());
    }

    #[test]
    fn availability_follows_samples_and_full_octaves() {
        let violin = lookup("violin").unwrap();
        assert!(violin.is_available(&note("A4")));
        assert!(!violin.is_available(&note("A#4")));
        // Outside the playable range
        assert!(!violin.is_available(&note("A2")));

        let cello = lookup("cello").unwrap();
        // Octave 3 is declared fully playable
        assert!(cello.is_available(&note("C#3")));
        assert!(!cello.is_available(&note("C#2")));
    }

    #[test]
    fn nearest_sample_prefers_lower_on_tie() {
        let piano = lookup("piano").unwrap();
        // C#4 sits between C4 and D#4; C4 is one away
        let choice = piano.nearest_sample(&note("C#4")).unwrap();
        assert_eq!(choice.sample, note("C4"));
        assert_eq!(choice.shift, 1);

        let xylophone = lookup("xylophone").unwrap();
        // D#4 is 3 from C4 and 4 from G4
        let choice = xylophone.nearest_sample(&note("D#4")).unwrap();
        assert_eq!(choice.sample, note("C4"));
        // E4: 4 from C4, 3 from G4
        let choice = xylophone.nearest_sample(&note("E4")).unwrap();
        assert_eq!(choice.sample, note("G4"));
        assert_eq!(choice.shift, -3);

        // G#4 is one away from both G4 and A4
        let violin = lookup("violin").unwrap();
        let choice = violin.nearest_sample(&note("G#4")).unwrap();
        assert_eq!(choice.sample, note("G4"));
        assert_eq!(choice.shift, 1);
    }

    #[test]
    fn sample_paths_use_s_for_sharps() {
        assert_eq!(sample_path("samples/piano/", &note("D#4")), "samples/piano/Ds4.mp3");
        assert_eq!(sample_path("", &note("C4")), "C4.mp3");
    }
}
