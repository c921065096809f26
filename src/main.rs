//! medialint — concurrent media-library linter.
//!
//! Thin binary entry point. All logic lives in the `medialint-core`
//! crate; this file only parses arguments, initialises logging, runs
//! the scan against stdout, and prints the summary block.

use anyhow::Context;
use clap::Parser;
use medialint_core::{run_scan, FfprobeProber, ScanOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "medialint",
    version,
    about = "Lint a media library for naming and stream-quality problems"
)]
struct Cli {
    /// Root directory of the media library to scan.
    root: PathBuf,

    /// Worker thread count (defaults to the number of logical CPUs).
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    // Structured logging goes to stderr; stdout carries only the
    // progress markers, the report, and the summary.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    tracing::info!("medialint starting");

    let cli = Cli::parse();

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("failed to resolve path {}", cli.root.display()))?;

    let mut options = ScanOptions::new(root);
    if let Some(workers) = cli.workers {
        options.workers = workers.max(1);
    }

    let probe = Arc::new(FfprobeProber::default());
    let outcome = run_scan(options, probe, &mut io::stdout())?;

    println!("Time:      {:.2} seconds", outcome.elapsed.as_secs_f64());
    println!("Total:     {}", outcome.total);
    println!("Processed: {}", outcome.processed);
    println!("Errors:    {}", outcome.files_with_diagnostics);

    Ok(())
}
