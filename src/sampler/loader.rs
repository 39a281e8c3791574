use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::buffer::SampleBuffer;
use crate::instrument::catalog::{sample_path, InstrumentDescriptor};
use crate::theory::note::NoteId;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode audio: {0}")]
    Decode(String),
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("sample not found: {0}")]
    NotFound(String),
    #[error("instrument '{0}' has no recorded samples")]
    NoSamples(String),
}

/// Source of recorded notes.
///
/// `path` is the asset path built by [`sample_path`], e.g. "piano/Ds4.mp3".
pub trait SampleLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<SampleBuffer, LoadError>;
}

/// Reads samples from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileSampleLoader {
    root: PathBuf,
}

impl FileSampleLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SampleLoader for FileSampleLoader {
    /// Falls back to a `.wav` file with the same stem when the requested
    /// file is missing, so `convert-samples --format wav` output loads too.
    fn load(&self, path: &str) -> Result<SampleBuffer, LoadError> {
        let full = self.root.join(path);
        if full.exists() {
            return SampleBuffer::decode_file(&full);
        }
        let wav = full.with_extension("wav");
        if wav.exists() {
            return SampleBuffer::decode_file(&wav);
        }
        Err(LoadError::NotFound(full.display().to_string()))
    }
}

/// Every recorded note of one instrument, ready for the sampler.
#[derive(Debug, Clone)]
pub struct SampleSet {
    pub instrument: &'static str,
    buffers: BTreeMap<NoteId, Arc<SampleBuffer>>,
}

impl SampleSet {
    pub fn new(instrument: &'static str) -> Self {
        Self {
            instrument,
            buffers: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, note: NoteId, buffer: SampleBuffer) {
        self.buffers.insert(note, Arc::new(buffer));
    }

    pub fn get(&self, note: &NoteId) -> Option<&Arc<SampleBuffer>> {
        self.buffers.get(note)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Closest loaded note to `note` and the semitone shift to reach it.
    ///
    /// Ties go to the lower sample.
    pub fn nearest(&self, note: &NoteId) -> Option<(NoteId, i32, &Arc<SampleBuffer>)> {
        self.buffers
            .iter()
            .min_by_key(|(sample, _)| ((note.midi() - sample.midi()).abs(), sample.midi()))
            .map(|(sample, buffer)| (*sample, note.midi() - sample.midi(), buffer))
    }
}

/// Load every recorded note of `descriptor` from `<base_url>/<Stem>.mp3`.
///
/// Fails on the first missing or undecodable sample.
pub fn load_instrument(
    descriptor: &'static InstrumentDescriptor,
    loader: &dyn SampleLoader,
    base_url: &str,
) -> Result<SampleSet, LoadError> {
    let notes = descriptor.sample_notes();
    if notes.is_empty() {
        return Err(LoadError::NoSamples(descriptor.name.to_string()));
    }

    let mut set = SampleSet::new(descriptor.name);
    for note in notes {
        let path = sample_path(base_url, &note);
        debug!(instrument = descriptor.name, %note, path = %path, "loading sample");
        set.insert(note, loader.load(&path)?);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::catalog::{lookup, resolve};
    use std::sync::Mutex;

    struct RecordingLoader {
        requested: Mutex<Vec<String>>,
    }

    impl SampleLoader for RecordingLoader {
        fn load(&self, path: &str) -> Result<SampleBuffer, LoadError> {
            self.requested.lock().unwrap().push(path.to_string());
            Ok(SampleBuffer::new(vec![0.0; 4], 48_000))
        }
    }

    #[test]
    fn loads_every_recorded_note() {
        let loader = RecordingLoader {
            requested: Mutex::new(Vec::new()),
        };
        let xylophone = lookup("xylophone").unwrap();
        let set = load_instrument(xylophone, &loader, "xylophone").unwrap();

        // C and G in octaves 4-7
        assert_eq!(set.len(), 8);
        let requested = loader.requested.lock().unwrap();
        assert_eq!(requested[0], "xylophone/C4.mp3");
        assert!(requested.contains(&"xylophone/G7.mp3".to_string()));
    }

    #[test]
    fn unknown_instrument_has_nothing_to_load() {
        let loader = RecordingLoader {
            requested: Mutex::new(Vec::new()),
        };
        let result = load_instrument(resolve("kazoo"), &loader, "");
        assert!(matches!(result, Err(LoadError::NoSamples(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileSampleLoader::new(dir.path());
        assert!(matches!(loader.load("piano/C4.mp3"), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn nearest_loaded_sample() {
        let mut set = SampleSet::new("test");
        set.insert("C4".parse().unwrap(), SampleBuffer::new(vec![0.0], 48_000));
        set.insert("A4".parse().unwrap(), SampleBuffer::new(vec![0.0], 48_000));

        let (sample, shift, _) = set.nearest(&"B4".parse().unwrap()).unwrap();
        assert_eq!(sample.to_string(), "A4");
        assert_eq!(shift, 2);
        assert!(SampleSet::new("empty").nearest(&"C4".parse().unwrap()).is_none());
    }
}
