//! convert-samples - batch convert recorded instrument samples
//!
//! Run with: cargo run --bin convert-samples -- --input raw/cello --output samples/cello --instrument cello

use color_eyre::eyre::{bail, Result as EyreResult, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tonebook::convert::{run, CliCommand, ConvertOptions, FfmpegEncoder, USAGE};

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let options = match ConvertOptions::from_args(std::env::args().skip(1)) {
        Ok(CliCommand::Convert(options)) => options,
        Ok(CliCommand::Help) => {
            print!("{USAGE}");
            return Ok(());
        }
        Err(e) => bail!("{e}\n\n{USAGE}"),
    };

    let encoder = FfmpegEncoder::new();
    if !options.dry_run {
        encoder.check().wrap_err("ffmpeg is required to convert samples")?;
    }

    let report = run(&options, &encoder)
        .wrap_err_with(|| format!("converting {}", options.input.display()))?;

    for path in &report.unmatched {
        warn!(file = %path.display(), "unmatched");
    }
    for (path, reason) in &report.failed {
        warn!(file = %path.display(), %reason, "failed");
    }
    info!("done: {}", report.summary());

    if !report.is_success(options.strict) {
        bail!(
            "{} unmatched and {} failed files (--strict)",
            report.unmatched.len(),
            report.failed.len()
        );
    }
    Ok(())
}
