//! The bounded worker pool that lints files concurrently.
//!
//! A fixed number of named OS threads share one bounded intake channel.
//! The discovery thread blocks on [`WorkerPool::submit`] when the
//! channel is full, so the queue can never grow unboundedly no matter
//! how fast the walk outruns the probes.
//!
//! Per-file failures never escape a worker: the whole per-file lint is
//! wrapped in `catch_unwind`, so a panic while checking one file is
//! logged and the worker moves on to the next path.

use crate::probe::MediaProbe;
use crate::report::{Classification, ReportAggregator};
use crate::rules::RuleSet;
use crate::scanner::{ProgressSink, ScanStats};
use crossbeam_channel::{Receiver, Sender};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Maximum number of paths that may queue up in the intake channel.
///
/// Discovery (a directory walk) is far cheaper than linting (a probe
/// subprocess per file), so the walk would otherwise buffer the entire
/// library up front. 1 024 slots keep every worker busy through any
/// probe-latency jitter while bounding queued paths to a few hundred
/// KiB of memory.
pub const INTAKE_CAPACITY: usize = 1_024;

/// Everything a worker needs to lint one file. Shared read-only across
/// the pool; the aggregator and stats handle their own synchronisation.
pub struct WorkerContext {
    pub rules: RuleSet,
    pub probe: Arc<dyn MediaProbe>,
    pub report: Arc<ReportAggregator>,
    pub stats: Arc<ScanStats>,
    /// Sink for the per-file `.` progress markers, if any.
    pub progress: Option<ProgressSink>,
}

/// Fixed-size pool of lint workers fed by a bounded intake queue.
pub struct WorkerPool {
    intake_tx: Option<Sender<PathBuf>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads (at least one) sharing the intake queue.
    pub fn new(workers: usize, ctx: Arc<WorkerContext>) -> io::Result<Self> {
        let (intake_tx, intake_rx) = crossbeam_channel::bounded::<PathBuf>(INTAKE_CAPACITY);

        let workers = (0..workers.max(1))
            .map(|i| {
                let rx = intake_rx.clone();
                let ctx = ctx.clone();
                thread::Builder::new()
                    .name(format!("medialint-worker-{i}"))
                    .spawn(move || worker_loop(rx, ctx))
            })
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Self {
            intake_tx: Some(intake_tx),
            workers,
        })
    }

    /// Enqueue one file path for linting. Blocks while the intake
    /// queue is full (backpressure on the discovering thread).
    pub fn submit(&self, path: PathBuf) {
        if let Some(tx) = &self.intake_tx {
            // Send only fails if every worker is gone, which means the
            // pool already tore down; nothing useful can be done here.
            if tx.send(path).is_err() {
                error!("intake channel closed: all workers exited early");
            }
        }
    }

    /// Signal that no further paths will arrive, then block until every
    /// submitted path has been fully processed and all workers exited.
    pub fn close_and_wait(mut self) {
        drop(self.intake_tx.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                // Unreachable while worker_loop catches per-file
                // panics, but a dead worker must not hang the join.
                error!("worker thread panicked outside per-file isolation");
            }
        }
    }
}

fn worker_loop(intake_rx: Receiver<PathBuf>, ctx: Arc<WorkerContext>) {
    // Iteration ends when the sender is dropped and the queue drains.
    for path in intake_rx.iter() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| lint_file(&path, &ctx)));
        if result.is_err() {
            error!(path = %path.display(), "checks panicked; skipping file");
        }
    }
}

/// Run every check against one file and record its diagnostics.
///
/// Checks for a single file run sequentially inside one worker, so the
/// file's diagnostics arrive in check-evaluation order (the aggregator
/// later stable-sorts them by classification).
fn lint_file(path: &Path, ctx: &WorkerContext) {
    if let Some(sink) = &ctx.progress {
        // Best effort: a full or broken progress sink must not stall
        // the lint.
        let mut sink = sink.lock();
        let _ = sink.write_all(b".");
        let _ = sink.flush();
    }

    let key = path.to_string_lossy();

    // Naming checks run whether or not the file probes as media.
    ctx.report.append(&key, ctx.rules.check_path(path));

    match ctx.probe.probe(path) {
        Ok(streams) => {
            ctx.stats.mark_processed();
            ctx.report.append(&key, ctx.rules.check_streams(&streams));
        }
        Err(err) => {
            // One diagnostic carrying the probe's reason; all
            // stream checks are skipped and the file does not count
            // as processed.
            debug!(path = %path.display(), "probe failed: {err}");
            ctx.report
                .add(&key, Classification::FormatUnsupported, err.to_string());
        }
    }
}
