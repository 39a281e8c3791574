//! Batch conversion of recorded instrument samples into the asset layout
//! the sampler loads (`<Stem>.<format>`, e.g. `Cs3.mp3`).
//!
//! Filenames are matched against a glob, the note is pulled out with an
//! instrument-specific regex, and each file is re-encoded by an external
//! [`Encoder`]. A single bad file never stops the batch.

pub mod encoder;
pub mod job;
pub mod options;
pub mod pattern;

use std::path::PathBuf;

use thiserror::Error;

pub use encoder::{Encoder, FfmpegEncoder};
pub use job::{run, ConversionReport};
pub use options::{CliCommand, ConvertOptions, OutputFormat, USAGE};
pub use pattern::{glob_to_regex, NotePattern};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("missing required option --{0}")]
    MissingOption(&'static str),

    #[error("invalid value for --{flag}: {value}")]
    InvalidOption { flag: &'static str, value: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    #[error("invalid file pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("encoder not found: {0}")]
    EncoderMissing(String),

    #[error("encoder failed ({status}): {stderr}")]
    EncoderFailed { status: String, stderr: String },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
