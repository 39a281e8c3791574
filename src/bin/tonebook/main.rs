//! tonebook - terminal music-theory explorer
//!
//! Run with: cargo run --bin tonebook -- [--instrument NAME] [--samples DIR]

mod app;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use app::TonebookApp;
use color_eyre::eyre::{bail, Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
tonebook - play instruments and explore intervals, meters and waveforms

USAGE:
    tonebook [--instrument NAME] [--samples DIR] [--log FILE]

OPTIONS:
    --instrument NAME   Instrument to load first [default: piano]
    --samples DIR       Directory with one folder of samples per instrument [default: samples]
    --log FILE          Log file [default: tonebook.log in the temp directory]
    -h, --help          Print this help
";

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let mut instrument = "piano".to_string();
    let mut samples = PathBuf::from("samples");
    let mut log_path = std::env::temp_dir().join("tonebook.log");

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--instrument" => instrument = next_value(&mut args, "--instrument")?,
            "--samples" => samples = PathBuf::from(next_value(&mut args, "--samples")?),
            "--log" => log_path = PathBuf::from(next_value(&mut args, "--log")?),
            "-h" | "--help" => {
                print!("{USAGE}");
                return Ok(());
            }
            other => bail!("unknown argument: {other}\n\n{USAGE}"),
        }
    }

    init_logging(&log_path)?;

    TonebookApp::new()
        .instrument(&instrument)
        .samples(samples)
        .run()
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> EyreResult<String> {
    match args.next() {
        Some(value) => Ok(value),
        None => bail!("{flag} needs a value"),
    }
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path).wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
