//! `ffprobe`-backed implementation of [`MediaProbe`].
//!
//! Runs `ffprobe -v error -print_format json -show_streams <path>` and
//! maps its JSON stream descriptors into [`StreamInfo`]. The child
//! process is polled against a wall-clock deadline and killed on
//! timeout, so one unreadable or hostile file can never hang a worker
//! indefinitely.

use crate::probe::{MediaProbe, ProbeError, StreamInfo, StreamKind};
use compact_str::CompactString;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default per-file probe budget.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How often the child is polled for exit while the deadline runs.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Probes media files by spawning `ffprobe`.
pub struct FfprobeProber {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffprobe"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FfprobeProber {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

impl MediaProbe for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<Vec<StreamInfo>, ProbeError> {
        let mut child = Command::new(&self.binary)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ProbeError::Launch)?;

        // Poll for exit under a deadline. `-show_streams` output is a
        // few KiB at most, well under the pipe buffer, so the child
        // does not block on a full pipe before exiting; if it ever
        // stalls anyway, the deadline kills it.
        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait().map_err(ProbeError::Io)? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                debug!(path = %path.display(), "probe killed on timeout");
                return Err(ProbeError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout).map_err(ProbeError::Io)?;
        }

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            let reason = stderr
                .lines()
                .next()
                .unwrap_or("ffprobe rejected the file")
                .to_owned();
            return Err(ProbeError::Unreadable { reason });
        }

        Ok(parse_ffprobe_json(&stdout)?)
    }
}

// Serde mirror of the slice of ffprobe's JSON we care about. Unknown
// fields are ignored; `bit_rate` arrives as a decimal string.

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<RawStream>,
}

#[derive(Deserialize)]
struct RawStream {
    #[serde(default)]
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    bit_rate: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    disposition: RawDisposition,
}

#[derive(Deserialize, Default)]
struct RawDisposition {
    #[serde(default)]
    attached_pic: u8,
}

/// Parse `ffprobe -print_format json -show_streams` output into stream
/// descriptors. A missing `streams` array maps to an empty list.
pub fn parse_ffprobe_json(json: &str) -> Result<Vec<StreamInfo>, serde_json::Error> {
    let output: ProbeOutput = serde_json::from_str(json)?;
    Ok(output.streams.into_iter().map(StreamInfo::from).collect())
}

impl From<RawStream> for StreamInfo {
    fn from(raw: RawStream) -> Self {
        let kind = match raw.codec_type.as_deref() {
            Some("video") => StreamKind::Video,
            Some("audio") => StreamKind::Audio,
            Some("subtitle") => StreamKind::Subtitle,
            _ => StreamKind::Other,
        };
        StreamInfo {
            index: raw.index,
            kind,
            attached_picture: raw.disposition.attached_pic == 1,
            bit_rate: raw.bit_rate.and_then(|s| s.parse().ok()),
            width: raw.width,
            height: raw.height,
            codec: raw
                .codec_name
                .map(CompactString::from)
                .unwrap_or_else(|| CompactString::from("unknown")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    const FIXTURE: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "width": 640,
                "height": 480,
                "bit_rate": "1048576",
                "disposition": { "default": 1, "attached_pic": 0 }
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "bit_rate": "128000"
            },
            {
                "index": 2,
                "codec_name": "subrip",
                "codec_type": "subtitle"
            },
            {
                "index": 3,
                "codec_name": "mjpeg",
                "codec_type": "video",
                "width": 600,
                "height": 882,
                "disposition": { "attached_pic": 1 }
            }
        ]
    }"#;

    #[test]
    fn parses_the_full_fixture() {
        let streams = parse_ffprobe_json(FIXTURE).unwrap();
        assert_eq!(streams.len(), 4);

        let video = &streams[0];
        assert_eq!(video.kind, StreamKind::Video);
        assert_eq!(video.codec, "h264");
        assert_eq!(video.bit_rate, Some(1_048_576));
        assert_eq!((video.width, video.height), (Some(640), Some(480)));
        assert!(!video.attached_picture);

        assert_eq!(streams[1].kind, StreamKind::Audio);
        assert_eq!(streams[2].kind, StreamKind::Subtitle);

        let cover = &streams[3];
        assert_eq!(cover.kind, StreamKind::Video);
        assert!(cover.attached_picture);
        assert_eq!(cover.bit_rate, None);
    }

    #[test]
    fn missing_streams_array_is_empty() {
        assert!(parse_ffprobe_json("{}").unwrap().is_empty());
    }

    #[test]
    fn unparseable_bit_rate_maps_to_none() {
        let json = r#"{"streams":[{"index":0,"codec_type":"video","codec_name":"vp9","bit_rate":"N/A"}]}"#;
        let streams = parse_ffprobe_json(json).unwrap();
        assert_eq!(streams[0].bit_rate, None);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(parse_ffprobe_json("not json").is_err());
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let prober = FfprobeProber::new(
            "/nonexistent/ffprobe-for-this-test",
            Duration::from_secs(1),
        );
        let err = prober.probe(Path::new("missing.mkv")).unwrap_err();
        assert!(matches!(err, ProbeError::Launch(_)), "got {err}");
        assert!(err.to_string().starts_with("failed to launch ffprobe"));
    }

    #[test]
    fn post_spawn_io_errors_do_not_claim_a_launch_failure() {
        let err = ProbeError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "pipe broke"));
        assert_eq!(err.to_string(), "ffprobe io error: pipe broke");
    }

    /// A child that outlives its deadline must be killed and reported
    /// as a timeout, promptly rather than after the child's own exit.
    #[cfg(unix)]
    #[test]
    fn stalling_probe_is_killed_on_timeout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("stall.sh");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let prober = FfprobeProber::new(&script, Duration::from_millis(50));
        let started = Instant::now();
        let err = prober.probe(Path::new("missing.mkv")).unwrap_err();

        assert!(matches!(err, ProbeError::Timeout { .. }), "got {err}");
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "the kill must not wait for the child to exit on its own"
        );
    }
}
