use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::ConvertError;

pub const USAGE: &str = "\
convert-samples - turn recorded instrument samples into <Note><Octave>.<format> files

USAGE:
    convert-samples --input DIR --output DIR [OPTIONS]

OPTIONS:
    --input DIR          Directory holding the source recordings
    --output DIR         Directory to write converted files to
    --instrument NAME    Filename pattern to use (cello, violin, viola,
                         contrabass, flute, piano; anything else uses a
                         generic note matcher)
    --format FORMAT      mp3, ogg or wav [default: mp3]
    --quality N          0 (best) to 9 [default: 2]
    --pattern GLOB       Which files to consider [default: *.aif*]
    --strict             Exit non-zero if any file was unmatched or failed
    --dry-run            Report what would be converted without encoding
    -h, --help           Print this help
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Mp3,
    Ogg,
    Wav,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Ogg => "ogg",
            OutputFormat::Wav => "wav",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(OutputFormat::Mp3),
            "ogg" => Ok(OutputFormat::Ogg),
            "wav" => Ok(OutputFormat::Wav),
            _ => Err(ConvertError::InvalidOption {
                flag: "format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Settings for one conversion batch
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub instrument: String,
    pub format: OutputFormat,
    /// 0 (best) ..= 9
    pub quality: u8,
    pub pattern: String,
    pub strict: bool,
    pub dry_run: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("converted"),
            instrument: "generic".to_string(),
            format: OutputFormat::Mp3,
            quality: 2,
            pattern: "*.aif*".to_string(),
            strict: false,
            dry_run: false,
        }
    }
}

/// What the command line asked for
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Convert(ConvertOptions),
    Help,
}

impl ConvertOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    pub fn instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instrument = instrument.into();
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Parse command-line arguments (without the program name).
    ///
    /// Values may be given as `--flag value` or `--flag=value`.
    pub fn from_args<I>(args: I) -> Result<CliCommand, ConvertError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = ConvertOptions::default();
        let mut input = None;
        let mut output = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
                _ => (arg.clone(), None),
            };

            let mut value = |name: &'static str| -> Result<String, ConvertError> {
                match inline.clone().or_else(|| args.next()) {
                    Some(v) if !v.is_empty() => Ok(v),
                    _ => Err(ConvertError::MissingOption(name)),
                }
            };

            match flag.as_str() {
                "-h" | "--help" => return Ok(CliCommand::Help),
                "--input" => input = Some(PathBuf::from(value("input")?)),
                "--output" => output = Some(PathBuf::from(value("output")?)),
                "--instrument" => options.instrument = value("instrument")?,
                "--format" => options.format = value("format")?.parse()?,
                "--quality" => {
                    let raw = value("quality")?;
                    options.quality = match raw.parse::<u8>() {
                        Ok(q) if q <= 9 => q,
                        _ => {
                            return Err(ConvertError::InvalidOption {
                                flag: "quality",
                                value: raw,
                            })
                        }
                    };
                }
                "--pattern" => options.pattern = value("pattern")?,
                "--strict" => options.strict = true,
                "--dry-run" => options.dry_run = true,
                _ => return Err(ConvertError::UnknownArgument(arg)),
            }
        }

        options.input = input.ok_or(ConvertError::MissingOption("input"))?;
        options.output = output.ok_or(ConvertError::MissingOption("output"))?;
        Ok(CliCommand::Convert(options))
    }
}
