use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::{glob_to_regex, ConvertError, ConvertOptions, Encoder, NotePattern};
use crate::theory::note::NoteId;

/// Outcome of a batch
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Source and destination of every file written (or planned, on a dry run)
    pub converted: Vec<(PathBuf, PathBuf)>,
    /// Files whose name held no recognizable note
    pub unmatched: Vec<PathBuf>,
    /// Files naming a note that an earlier file already produced
    pub duplicates: Vec<(PathBuf, NoteId)>,
    pub failed: Vec<(PathBuf, String)>,
}

impl ConversionReport {
    pub fn notes(&self) -> usize {
        self.converted.len()
    }

    /// Whether the batch should count as a success.
    ///
    /// Unmatched and failed files only fail the batch in strict mode.
    pub fn is_success(&self, strict: bool) -> bool {
        !strict || (self.unmatched.is_empty() && self.failed.is_empty())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} converted, {} unmatched, {} duplicate, {} failed",
            self.converted.len(),
            self.unmatched.len(),
            self.duplicates.len(),
            self.failed.len()
        )
    }
}

/// Convert every matching file in `options.input`.
///
/// Errors are returned only for problems that affect the whole batch
/// (unreadable input directory, bad glob, output directory not
/// creatable). Per-file problems are logged and recorded in the report.
pub fn run(options: &ConvertOptions, encoder: &dyn Encoder) -> Result<ConversionReport, ConvertError> {
    let glob = glob_to_regex(&options.pattern)?;
    let pattern = NotePattern::for_instrument(&options.instrument)?;
    let files = matching_files(&options.input, |name| glob.is_match(name))?;

    info!(
        input = %options.input.display(),
        output = %options.output.display(),
        instrument = pattern.instrument(),
        files = files.len(),
        dry_run = options.dry_run,
        "converting samples"
    );

    if !options.dry_run && !files.is_empty() {
        fs::create_dir_all(&options.output).map_err(|e| ConvertError::io(&options.output, e))?;
    }

    let mut report = ConversionReport::default();
    let mut produced: BTreeMap<NoteId, PathBuf> = BTreeMap::new();

    for path in files {
        let name = file_name(&path);
        let Some(note) = pattern.extract(&name) else {
            warn!(file = %name, "no note in file name, skipping");
            report.unmatched.push(path);
            continue;
        };

        if let Some(first) = produced.get(&note) {
            warn!(file = %name, %note, first = %first.display(), "note already converted, skipping");
            report.duplicates.push((path, note));
            continue;
        }

        let target = options
            .output
            .join(format!("{}.{}", note.file_stem(), options.format.extension()));

        if options.dry_run {
            info!(file = %name, target = %target.display(), "would convert");
        } else if let Err(e) = encoder.encode(&path, &target, options.format, options.quality) {
            error!(file = %name, error = %e, "conversion failed");
            report.failed.push((path, e.to_string()));
            continue;
        } else {
            info!(file = %name, target = %target.display(), "converted");
        }

        produced.insert(note, path.clone());
        report.converted.push((path, target));
    }

    info!("{}", report.summary());
    Ok(report)
}

/// Regular files directly inside `dir` whose name passes `keep`, sorted.
fn matching_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, ConvertError> {
    if !dir.is_dir() {
        return Err(ConvertError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))? {
        let entry = entry.map_err(|e| ConvertError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && keep(&file_name(&path)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::OutputFormat;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeEncoder {
        calls: RefCell<Vec<PathBuf>>,
    }

    impl Encoder for FakeEncoder {
        fn encode(&self, input: &Path, output: &Path, _: OutputFormat, _: u8) -> Result<(), ConvertError> {
            self.calls.borrow_mut().push(output.to_path_buf());
            if file_name(input).contains("broken") {
                return Err(ConvertError::EncoderFailed {
                    status: "exit status: 1".to_string(),
                    stderr: "invalid data".to_string(),
                });
            }
            fs::write(output, b"encoded").map_err(|e| ConvertError::io(output, e))
        }
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"aiff").unwrap();
    }

    #[test]
    fn converts_matching_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        touch(input.path(), "Cello.arco.ff.sulA.C#3.stereo.aif");
        touch(input.path(), "Cello.arco.ff.sulA.D3.stereo.aif");
        touch(input.path(), "notes.txt");

        let options = ConvertOptions::new(input.path(), output.path()).instrument("cello");
        let encoder = FakeEncoder::default();
        let report = run(&options, &encoder).unwrap();

        assert_eq!(report.notes(), 2);
        assert!(output.path().join("Cs3.mp3").exists());
        assert!(output.path().join("D3.mp3").exists());
        assert!(report.unmatched.is_empty());
        assert!(report.is_success(true));
    }

    #[test]
    fn failures_and_unmatched_do_not_stop_the_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        touch(input.path(), "Cello.arco.ff.sulA.broken.stereo.aif");
        touch(input.path(), "Cello.arco.ff.sulC.C2.stereo.aif");
        touch(input.path(), "Piano.ff.A4.aiff");

        let options = ConvertOptions::new(input.path(), output.path()).instrument("cello");
        let report = run(&options, &FakeEncoder::default()).unwrap();

        // The broken file has no note, the piano file does not match the cello pattern
        assert_eq!(report.unmatched.len(), 2);
        assert_eq!(report.notes(), 1);
        assert!(report.is_success(false));
        assert!(!report.is_success(true));
    }

    #[test]
    fn encoder_errors_are_recorded() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        touch(input.path(), "broken_A4.aif");
        touch(input.path(), "good_B4.aif");

        let options = ConvertOptions::new(input.path(), output.path()).format(OutputFormat::Wav);
        let report = run(&options, &FakeEncoder::default()).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].1.contains("invalid data"));
        assert_eq!(report.converted[0].1, output.path().join("B4.wav"));
    }

    #[test]
    fn duplicate_notes_keep_the_first_file() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        touch(input.path(), "Piano.ff.Db4.aiff");
        touch(input.path(), "Piano.pp.Db4.aiff");

        let options = ConvertOptions::new(input.path(), output.path()).instrument("piano");
        let report = run(&options, &FakeEncoder::default()).unwrap();
        assert_eq!(report.notes(), 1);
        assert_eq!(report.duplicates.len(), 1);
        assert!(report.converted[0].0.ends_with("Piano.ff.Db4.aiff"));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let input = tempfile::tempdir().unwrap();
        let output = input.path().join("out");
        touch(input.path(), "x_C4.aif");

        let options = ConvertOptions::new(input.path(), &output).dry_run(true);
        let encoder = FakeEncoder::default();
        let report = run(&options, &encoder).unwrap();
        assert_eq!(report.notes(), 1);
        assert!(encoder.calls.borrow().is_empty());
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let options = ConvertOptions::new("/nonexistent/samples", "out");
        assert!(matches!(
            run(&options, &FakeEncoder::default()),
            Err(ConvertError::NotADirectory(_))
        ));
    }
}
