//! The fixed set of per-file checks.
//!
//! Every check is a pure function of `(path, metadata)` with no shared
//! mutable state, so a [`RuleSet`] can be used concurrently by any
//! number of workers. Path checks run unconditionally; stream checks
//! run only when the probe succeeded.

pub mod naming;
pub mod streams;

use crate::probe::StreamInfo;
use crate::report::Diagnostic;
use compact_str::CompactString;
use naming::NamingRules;
use std::path::Path;

/// One mebibit, in bits. <https://en.wikipedia.org/wiki/Binary_prefix>
pub const MEBIBIT: u64 = 1_048_576;

/// Thresholds and allow-lists for the stream checks.
#[derive(Clone, Debug)]
pub struct RuleConfig {
    /// Video streams at or below this bit rate (bits/s) are flagged.
    /// A declared bit rate of exactly zero means "unknown" and is
    /// never flagged.
    pub min_bit_rate: u64,
    /// Video streams whose `width * height` is at or below this pixel
    /// count are flagged.
    pub min_pixel_count: u64,
    /// Codec identifiers that pass the codec check.
    pub allowed_codecs: Vec<CompactString>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_bit_rate: 2 * MEBIBIT,
            min_pixel_count: 1280 * 720,
            allowed_codecs: ["h264", "hevc", "vp9", "av1"]
                .into_iter()
                .map(CompactString::from)
                .collect(),
        }
    }
}

/// The compiled, immutable rule set shared by all workers.
pub struct RuleSet {
    config: RuleConfig,
    naming: NamingRules,
}

impl RuleSet {
    /// Compile the naming patterns once, up front. Compilation happens
    /// before any worker starts so a bad pattern is a startup failure,
    /// never a mid-scan one.
    pub fn new(config: RuleConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            config,
            naming: NamingRules::new()?,
        })
    }

    /// Path-based checks (naming conventions). Run for every file,
    /// whether or not it probes as media.
    pub fn check_path(&self, path: &Path) -> Vec<Diagnostic> {
        self.naming.check(path)
    }

    /// Stream-based checks. Run only when the probe succeeded.
    pub fn check_streams(&self, streams: &[StreamInfo]) -> Vec<Diagnostic> {
        streams::check(&self.config, streams)
    }
}
