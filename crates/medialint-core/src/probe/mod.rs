//! Media probing — extracting stream-level metadata from a file.
//!
//! The [`MediaProbe`] trait is the seam between the worker pool and the
//! actual prober. Production uses [`FfprobeProber`](ffprobe::FfprobeProber),
//! which shells out to `ffprobe`; tests substitute an in-memory stub.

pub mod ffprobe;

use compact_str::CompactString;
use std::io;
use std::path::Path;
use thiserror::Error;

pub use ffprobe::FfprobeProber;

/// Kind of one track inside a media container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Other,
}

/// Metadata for a single stream, as reported by the prober.
///
/// Optional fields stay `None` when the container does not declare
/// them; a declared-but-zero bit rate is kept as `Some(0)` so rule code
/// can apply the "zero means unknown" policy explicitly.
#[derive(Clone, Debug)]
pub struct StreamInfo {
    /// Zero-based track index within the container.
    pub index: usize,
    pub kind: StreamKind,
    /// Whether the stream is an attached still image (cover art).
    pub attached_picture: bool,
    /// Bit rate in bits per second, when declared.
    pub bit_rate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Codec identifier, e.g. `h264` or `mpeg2video`.
    pub codec: CompactString,
}

/// Why a file could not be probed.
///
/// Every variant renders as a one-line reason; the worker puts that
/// reason verbatim into the file's `Format/Unsupported` diagnostic.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to launch ffprobe: {0}")]
    Launch(io::Error),
    /// I/O failure after a successful launch (polling the child or
    /// reading its pipes).
    #[error("ffprobe io error: {0}")]
    Io(io::Error),
    /// The prober ran but rejected the file (unknown container,
    /// truncated data, permission error inside the prober, ...).
    #[error("{reason}")]
    Unreadable { reason: String },
    #[error("probe timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("unparseable probe output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Extracts stream metadata from one file, or fails with a reason.
///
/// Implementations must be safe to call concurrently from many worker
/// threads for different paths.
pub trait MediaProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<Vec<StreamInfo>, ProbeError>;
}
