//! Diagnostic taxonomy and the thread-safe report store.
//!
//! Workers append [`Diagnostic`]s into a shared [`ReportAggregator`]
//! keyed by file path while the scan runs; after all workers have
//! joined, the aggregator is drained once into a deterministically
//! ordered report.

pub mod aggregator;
pub mod classification;

pub use aggregator::ReportAggregator;
pub use classification::{Classification, Diagnostic};
