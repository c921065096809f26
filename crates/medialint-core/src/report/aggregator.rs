//! Thread-safe multi-map from file path to its collected diagnostics.
//!
//! Any number of workers may call [`ReportAggregator::add`] concurrently
//! for distinct or identical paths. A single coarse mutex serialises
//! both key creation and append, so no two workers can ever both
//! believe they created the first entry for a path.
//!
//! Draining is single-threaded and happens exactly once, after the
//! worker pool has been joined. Output order is fully deterministic
//! regardless of completion order: paths sort ASCII-case-insensitively
//! (byte order breaks ties), and within one path diagnostics sort by
//! [`Classification`] with insertion order preserved for equal
//! classifications.

use crate::report::{Classification, Diagnostic};
use compact_str::CompactString;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::{self, Write};

/// Collects diagnostics from concurrent workers, keyed by file path.
#[derive(Default)]
pub struct ReportAggregator {
    store: Mutex<HashMap<String, Vec<Diagnostic>>>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one diagnostic for `path`, creating the path's report on
    /// first use. Safe to call from any number of threads.
    pub fn add(&self, path: &str, classification: Classification, message: impl Into<CompactString>) {
        let diagnostic = Diagnostic::new(classification, message);
        let mut store = self.store.lock();
        store.entry(path.to_owned()).or_default().push(diagnostic);
    }

    /// Record a batch of diagnostics for `path` under one lock
    /// acquisition. An empty batch creates no entry.
    pub fn append(&self, path: &str, diagnostics: Vec<Diagnostic>) {
        if diagnostics.is_empty() {
            return;
        }
        let mut store = self.store.lock();
        store.entry(path.to_owned()).or_default().extend(diagnostics);
    }

    /// Number of distinct paths that received at least one diagnostic.
    pub fn file_count(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Write the sorted report, one line per diagnostic:
    /// `<path>: <classification-name>: <message>`.
    ///
    /// Must only run after every worker has joined. Returns the number
    /// of distinct paths in the report (the "files with errors" count).
    pub fn drain_and_print(&self, out: &mut dyn Write) -> io::Result<usize> {
        let mut store = self.store.lock();

        let mut keys: Vec<String> = store.keys().cloned().collect();
        keys.sort_by(|a, b| cmp_paths(a, b));

        for key in &keys {
            if let Some(report) = store.get_mut(key) {
                // Stable sort: equal classifications keep insertion order.
                report.sort_by_key(|d| d.classification);
                for diagnostic in report.iter() {
                    writeln!(
                        out,
                        "{key}: {}: {}",
                        diagnostic.classification.display_name(),
                        diagnostic.message
                    )?;
                }
            }
        }

        Ok(keys.len())
    }
}

/// ASCII-case-insensitive path comparison with a byte-order tiebreak so
/// keys that fold equal still print in one fixed order.
fn cmp_paths(a: &str, b: &str) -> Ordering {
    let folded = a
        .bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()));
    folded.then_with(|| a.cmp(b))
}
