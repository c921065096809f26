//! Scan orchestration: walk the tree, feed the pool, drain the report.
//!
//! The walk is physical (symlinks are not followed) and stays on the
//! root's filesystem. Only regular files are submitted; directories
//! and special files never reach the workers. Completion order across
//! files is nondeterministic, but the drained report is byte-identical
//! across runs because ordering is established entirely at print time.

pub mod pool;

use crate::probe::MediaProbe;
use crate::report::ReportAggregator;
use crate::rules::{RuleConfig, RuleSet};
use parking_lot::Mutex;
use pool::{WorkerContext, WorkerPool};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Shared sink for live progress markers.
///
/// Workers write one `.` per linted file and the driver terminates the
/// dot line with a newline, all on this one sink — the report writer
/// stays separate. `None` disables progress output entirely.
pub type ProgressSink = Arc<Mutex<Box<dyn Write + Send>>>;

/// A progress sink over stdout, the default for CLI scans.
pub fn stdout_progress() -> ProgressSink {
    Arc::new(Mutex::new(Box::new(io::stdout()) as Box<dyn Write + Send>))
}

/// Process-wide scan counters, shared by handle with every worker.
///
/// `total` is incremented by the discovery thread per submitted file;
/// `processed` by a worker once a file's probe succeeds. Reads are only
/// meaningful after the pool has been joined, so relaxed ordering is
/// enough.
#[derive(Default)]
pub struct ScanStats {
    total: AtomicU64,
    processed: AtomicU64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_discovered(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

/// Configuration for one scan.
pub struct ScanOptions {
    /// Resolved root directory of the library.
    pub root: PathBuf,
    /// Worker thread count; fixed for the lifetime of the pool.
    pub workers: usize,
    pub rules: RuleConfig,
    /// Where the per-file `.` markers go while the scan runs.
    /// Defaults to stdout; `None` disables progress output.
    pub progress: Option<ProgressSink>,
}

impl ScanOptions {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            workers: num_cpus::get(),
            rules: RuleConfig::default(),
            progress: Some(stdout_progress()),
        }
    }
}

/// Final numbers of a completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Regular files discovered and submitted.
    pub total: u64,
    /// Files whose probe succeeded and whose checks all ran.
    pub processed: u64,
    /// Distinct files that received at least one diagnostic.
    pub files_with_diagnostics: usize,
    pub elapsed: Duration,
}

/// Run a full scan: discover, lint concurrently, then print the sorted
/// report to `out`.
///
/// Traversal errors are logged once each and never stop work that was
/// already submitted; whatever diagnostics were collected still print.
pub fn run_scan(
    options: ScanOptions,
    probe: Arc<dyn MediaProbe>,
    out: &mut dyn Write,
) -> anyhow::Result<ScanOutcome> {
    let start = Instant::now();

    let report = Arc::new(ReportAggregator::new());
    let stats = Arc::new(ScanStats::new());
    let rules = RuleSet::new(options.rules.clone())?;

    let ctx = Arc::new(WorkerContext {
        rules,
        probe,
        report: report.clone(),
        stats: stats.clone(),
        progress: options.progress.clone(),
    });
    let pool = WorkerPool::new(options.workers, ctx)?;

    info!(root = %options.root.display(), workers = options.workers, "scan starting");

    let walker = WalkDir::new(&options.root)
        .follow_links(false)
        .same_file_system(true);

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                stats.mark_discovered();
                // Blocks when the intake queue is full.
                pool.submit(entry.into_path());
            }
            Ok(_) => {}
            Err(err) => {
                // Non-fatal: an unreadable subtree loses only its own
                // files. An unreadable root simply ends the walk here
                // and the partial report still prints.
                warn!("tree walk error: {err}");
            }
        }
    }

    pool.close_and_wait();

    if let Some(sink) = &options.progress {
        // Terminate the progress-dot line on the same sink the dots
        // went to. Best effort, like the dots themselves.
        let mut sink = sink.lock();
        let _ = writeln!(sink);
    }

    let files_with_diagnostics = report.drain_and_print(out)?;

    let outcome = ScanOutcome {
        total: stats.total(),
        processed: stats.processed(),
        files_with_diagnostics,
        elapsed: start.elapsed(),
    };
    info!(
        total = outcome.total,
        processed = outcome.processed,
        flagged = outcome.files_with_diagnostics,
        "scan complete"
    );
    Ok(outcome)
}
