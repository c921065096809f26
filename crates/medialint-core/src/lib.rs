//! medialint core — concurrent media-library linting.
//!
//! This crate contains all scanning and reporting logic with zero CLI
//! dependencies.
//!
//! # Modules
//!
//! - [`report`] — diagnostic taxonomy and the thread-safe report store.
//! - [`rules`] — the fixed set of per-file checks (naming + streams).
//! - [`probe`] — stream-metadata extraction via `ffprobe`.
//! - [`scanner`] — the worker pool and the scan driver.
//!
//! # Pipeline
//!
//! ```text
//! walk root ──submit──▶ WorkerPool ──▶ RuleSet + MediaProbe
//!                            │
//!                            ▼
//!                    ReportAggregator ──drain──▶ sorted report
//! ```
//!
//! Files complete in any order; the printed report does not depend on
//! that order in any way.

pub mod probe;
pub mod report;
pub mod rules;
pub mod scanner;

pub use probe::{FfprobeProber, MediaProbe, ProbeError, StreamInfo, StreamKind};
pub use report::{Classification, Diagnostic, ReportAggregator};
pub use rules::{RuleConfig, RuleSet};
pub use scanner::{run_scan, ProgressSink, ScanOptions, ScanOutcome, ScanStats};
