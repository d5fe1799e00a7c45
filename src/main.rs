use std::io::{self, BufWriter};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use onebrc::ScanConfig;

/// Per-station min/mean/max for a file of `station;value` lines.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file, one `station;value` record per line
    input: PathBuf,

    /// Number of worker threads (default: logical CPUs)
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ScanConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.input, cli.threads, cli.log_level);

    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let report = onebrc::run(&config)
        .with_context(|| format!("failed to aggregate {}", config.input_path.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    report.write_to(&mut out)?;

    Ok(())
}
