use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::ConvertError;
use crate::theory::note::NoteId;

/// Filename patterns per instrument. Capture group 1 is the note.
const PATTERNS: &[(&str, &str)] = &[
    ("cello", r"^(?i:cello)\.arco\.\w+\.sul[A-G]\.([A-G][#b]?\d)\."),
    ("violin", r"^(?i:violin)\.arco\.\w+\.sul[A-G]\.([A-G][#b]?\d)\."),
    ("viola", r"^(?i:viola)\.arco\.\w+\.sul[A-G]\.([A-G][#b]?\d)\."),
    ("contrabass", r"^(?i:bass)\.arco\.\w+\.sul[A-G]\.([A-G][#b]?\d)\."),
    ("flute", r"^(?i:flute)\.(?:nonvib|vib)\.\w+\.([A-G][#b]?\d)\."),
    ("piano", r"^(?i:piano)\.\w+\.([A-G][#b]?\d)\."),
];

/// Any note-looking token anywhere in the name
const GENERIC: &str = r"([A-G][#b]?\d)";

/// Extracts the note from a sample filename.
#[derive(Debug, Clone)]
pub struct NotePattern {
    instrument: String,
    regex: Regex,
}

impl NotePattern {
    /// Pattern for `instrument`, or the generic one when it has none.
    pub fn for_instrument(instrument: &str) -> Result<Self, ConvertError> {
        let key = instrument.trim().to_ascii_lowercase();
        let source = PATTERNS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, source)| *source)
            .unwrap_or_else(|| {
                debug!(instrument = %key, "no filename pattern, using generic");
                GENERIC
            });

        Ok(Self {
            instrument: key,
            regex: Regex::new(source)?,
        })
    }

    /// Custom pattern; group 1 must capture the note.
    pub fn custom(instrument: &str, source: &str) -> Result<Self, ConvertError> {
        Ok(Self {
            instrument: instrument.to_string(),
            regex: Regex::new(source)?,
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Note named in `file_name`, sharp-spelled.
    pub fn extract(&self, file_name: &str) -> Option<NoteId> {
        let token = self.regex.captures(file_name)?.get(1)?.as_str();
        NoteId::parse_loose(token).ok()
    }
}

/// Instruments with a dedicated filename pattern
pub fn known_instruments() -> impl Iterator<Item = &'static str> {
    PATTERNS.iter().map(|(name, _)| *name)
}

/// Translate a shell glob (`*`, `?`) into an anchored, case-insensitive
/// regex over a single file name.
pub fn glob_to_regex(glob: &str) -> Result<Regex, ConvertError> {
    let mut source = String::from("^");
    for c in glob.chars() {
        match c {
            '*' => source.push_str("[^/]*"),
            '?' => source.push_str("[^/]"),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    Ok(RegexBuilder::new(&source).case_insensitive(true).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> NoteId {
        text.parse().unwrap()
    }

    #[test]
    fn cello_file_yields_sharp_note() {
        let pattern = NotePattern::for_instrument("cello").unwrap();
        let found = pattern.extract("Cello.arco.ff.sulA.C#3.stereo.aif").unwrap();
        assert_eq!(found, note("C#3"));
        assert_eq!(found.file_stem(), "Cs3");
    }

    #[test]
    fn flats_are_respelled() {
        let pattern = NotePattern::for_instrument("Piano").unwrap();
        assert_eq!(pattern.extract("Piano.ff.Db4.aiff"), Some(note("C#4")));
        assert_eq!(pattern.extract("Piano.pp.Bb0.aiff"), Some(note("A#0")));
    }

    #[test]
    fn instrument_patterns_reject_other_files() {
        let violin = NotePattern::for_instrument("violin").unwrap();
        assert_eq!(violin.extract("Violin.arco.mf.sulG.G3.stereo.aif"), Some(note("G3")));
        assert_eq!(violin.extract("Cello.arco.ff.sulA.C#3.stereo.aif"), None);

        let flute = NotePattern::for_instrument("flute").unwrap();
        assert_eq!(flute.extract("Flute.nonvib.ff.A4.stereo.aif"), Some(note("A4")));
        assert_eq!(flute.extract("readme.txt"), None);

        let bass = NotePattern::for_instrument("contrabass").unwrap();
        assert_eq!(bass.extract("Bass.arco.ff.sulE.E1.stereo.aif"), Some(note("E1")));
    }

    #[test]
    fn unknown_instrument_uses_generic_pattern() {
        let pattern = NotePattern::for_instrument("harp").unwrap();
        assert_eq!(pattern.as_str(), GENERIC);
        assert_eq!(pattern.extract("harp_F#2_loud.wav"), Some(note("F#2")));
        assert_eq!(pattern.extract("harp_loud.wav"), None);
    }

    #[test]
    fn glob_matches_whole_name_ignoring_case() {
        let glob = glob_to_regex("*.aif*").unwrap();
        assert!(glob.is_match("Cello.arco.ff.sulA.C#3.stereo.aif"));
        assert!(glob.is_match("Piano.ff.A4.AIFF"));
        assert!(!glob.is_match("Piano.ff.A4.wav"));

        let single = glob_to_regex("note?.wav").unwrap();
        assert!(single.is_match("note1.wav"));
        assert!(!single.is_match("note12.wav"));
        assert!(glob_to_regex("[x].wav").unwrap().is_match("[x].wav"));
    }

    #[test]
    fn custom_pattern_errors_surface() {
        assert!(NotePattern::custom("x", "(").is_err());
        let custom = NotePattern::custom("x", r"note-([A-G]s?\d)").unwrap();
        assert_eq!(custom.extract("note-Ds4.wav"), Some(note("D#4")));
        assert!(known_instruments().any(|name| name == "viola"));
    }
}
