use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wer::{BatchRunner, RenderOptions, render_alignment};

mod config;
mod inputs;
mod report;

use config::{Config, OutputFormat};
use inputs::{InputError, Inputs};

#[derive(Parser, Debug)]
#[command(name = "wer", version)]
#[command(
    about = "Calculate a word error rate (WER) from provided sets of correct and actual transcripts."
)]
pub struct Cli {
    /// Path to a file/folder of what the text is supposed to be
    #[arg(long, short = 'e', value_name = "PATH")]
    expected: PathBuf,

    /// Path to a file/folder of what the text actually was
    #[arg(long, short = 'a', value_name = "PATH")]
    actual: PathBuf,

    /// JSON config file; flags override its values
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Regex whose matches are blanked out before comparison
    #[arg(long, value_name = "REGEX")]
    ignore_pattern: Option<String>,

    /// Align line N of the expected text only against line N of the actual text
    #[arg(long)]
    enforce_line_count: bool,

    /// Print the REF/HYP alignment (file pairs only)
    #[arg(long)]
    visualize: bool,

    /// Leave the S/D/I marker row out of the alignment
    #[arg(long)]
    no_markers: bool,

    /// Speaker label stripped from the start of each line (repeatable)
    #[arg(long, value_name = "PREFIX")]
    speaker_prefix: Vec<String>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Give up on a directory comparison after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline_secs: Option<u64>,

    /// Log filter (e.g. `debug`, `wer=trace`); defaults to RUST_LOG, then `warn`
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.log_level.as_deref()) {
        eprintln!("Error: {err}");
        process::exit(2);
    }

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(exit_code(&err));
        }
    }
}

fn init_logging(level: Option<&str>) -> wer::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| wer::Error::Config(format!("invalid --log-level '{level}': {e}")))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// 2 usage/config, 3 input shape, 4 scoring, 5 internal
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(input) = err.downcast_ref::<InputError>() {
        return input.exit_code();
    }
    match err.downcast_ref::<wer::Error>() {
        Some(wer::Error::Config(_)) => 2,
        Some(wer::Error::Shape(_)) => 3,
        Some(wer::Error::Division | wer::Error::EmptyBatch) => 4,
        Some(
            wer::Error::DeadlineExceeded { .. }
            | wer::Error::Worker(_)
            | wer::Error::Io(_)
            | wer::Error::Serialization(_),
        ) => 5,
        None => 5,
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::load(cli.config.as_deref())?.with_overrides(&cli);
    config.validate()?;
    debug!("Effective config: {:?}", config);

    match inputs::classify(&cli.expected, &cli.actual)? {
        Inputs::Files => compare_files(&cli.expected, &cli.actual, &config),
        Inputs::Directories => compare_directories(&cli.expected, &cli.actual, &config).await,
    }
}

fn compare_files(expected: &Path, actual: &Path, config: &Config) -> anyhow::Result<i32> {
    let read = |path: &Path| {
        inputs::read_lines(path, &config.speaker_prefixes)
            .with_context(|| format!("Failed to read transcript {}", path.display()))
    };
    let reference = read(expected)?;
    let hypothesis = read(actual)?;

    let comparison = wer::compare(&reference, &hypothesis, &config.normalization)?;
    info!(
        "{} vs {}: wer {}",
        expected.display(),
        actual.display(),
        comparison.result.wer
    );

    let visualization = if config.visualize {
        let options = RenderOptions {
            markers: config.markers,
        };
        Some(render_alignment(&comparison.alignment, &options)?)
    } else {
        None
    };

    match config.format {
        OutputFormat::Text => print!(
            "{}",
            report::single_text(&comparison.result, visualization.as_deref())
        ),
        OutputFormat::Json => println!(
            "{}",
            report::single_json(expected, actual, &comparison, visualization.as_deref())
                .map_err(wer::Error::from)?
        ),
    }
    Ok(0)
}

async fn compare_directories(
    expected: &Path,
    actual: &Path,
    config: &Config,
) -> anyhow::Result<i32> {
    let loaded = inputs::load_pairs(expected, actual, &config.speaker_prefixes)?;

    let mut runner = BatchRunner::new(&config.normalization)?;
    if let Some(secs) = config.deadline_secs {
        runner = runner.with_deadline(Duration::from_secs(secs));
    }
    let mut batch = runner.run(loaded.pairs).await?;
    batch.failures.extend(loaded.unreadable);

    // an all-failed batch still gets its failures listed
    let summary = match batch.summary() {
        Ok(summary) => Some(summary),
        Err(wer::Error::EmptyBatch) if batch.has_failures() => None,
        Err(err) => return Err(err.into()),
    };

    match config.format {
        OutputFormat::Text => print!("{}", report::batch_text(&batch, summary.as_ref())),
        OutputFormat::Json => println!(
            "{}",
            report::batch_json(expected, actual, &batch, summary.as_ref())
                .map_err(wer::Error::from)?
        ),
    }

    Ok(if batch.has_failures() { 4 } else { 0 })
}
