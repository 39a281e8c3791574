use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::trace;

use super::{ConvertError, OutputFormat};

/// Re-encodes one audio file.
pub trait Encoder {
    fn encode(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        quality: u8,
    ) -> Result<(), ConvertError>;
}

/// Shells out to `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Fails with [`ConvertError::EncoderMissing`] when the program cannot run.
    pub fn check(&self) -> Result<(), ConvertError> {
        let status = Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(ConvertError::EncoderMissing(self.program.display().to_string())),
        }
    }

    /// Arguments for one conversion; quality 0 is best for every format.
    pub fn arguments(input: &Path, output: &Path, format: OutputFormat, quality: u8) -> Vec<String> {
        let quality = quality.min(9);
        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.display().to_string(),
        ];
        match format {
            OutputFormat::Mp3 => args.extend(
                ["-codec:a", "libmp3lame", "-q:a"]
                    .map(String::from)
                    .into_iter()
                    .chain([quality.to_string()]),
            ),
            // Vorbis quality runs the other way (10 is best)
            OutputFormat::Ogg => args.extend(
                ["-codec:a", "libvorbis", "-q:a"]
                    .map(String::from)
                    .into_iter()
                    .chain([(10 - quality).to_string()]),
            ),
            OutputFormat::Wav => args.extend(["-codec:a", "pcm_s16le"].map(String::from)),
        }
        args.push(output.display().to_string());
        args
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        quality: u8,
    ) -> Result<(), ConvertError> {
        let args = Self::arguments(input, output, format, quality);
        trace!(program = %self.program.display(), ?args, "running encoder");

        let result = Command::new(&self.program)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ConvertError::EncoderMissing(self.program.display().to_string())
                }
                _ => ConvertError::io(input, e),
            })?;

        if result.status.success() {
            Ok(())
        } else {
            Err(ConvertError::EncoderFailed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            })
        }
    }
}
