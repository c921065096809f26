//! Diagnostic categories and the diagnostic value itself.

use compact_str::CompactString;
use std::fmt;

/// Category of a reported problem.
///
/// Declaration order is display-priority order: within one file's
/// report, diagnostics are sorted by this enum's derived `Ord`, so a
/// variant declared earlier always prints before a later one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classification {
    /// The probe could not open or parse the file.
    FormatUnsupported,
    /// A path component contains characters unsafe for file paths.
    NamingForbidden,
    /// A movie file is missing its `(YYYY)` year token.
    NamingMovie,
    /// A TV episode is missing its `SxxEyy` token.
    NamingTv,
    /// The file carries no subtitle stream at all.
    SubtitlesPresence,
    /// A video stream's bit rate is at or below the configured floor.
    VideoBitrate,
    /// A video stream uses a codec outside the allow-list.
    VideoCodec,
    /// A video stream's pixel count is at or below the configured floor.
    VideoResolution,
}

impl Classification {
    /// Fixed display name used verbatim in report lines.
    pub fn display_name(self) -> &'static str {
        match self {
            Classification::FormatUnsupported => "Format/Unsupported",
            Classification::NamingForbidden => "Naming/Forbidden",
            Classification::NamingMovie => "Naming/Movie",
            Classification::NamingTv => "Naming/TV",
            Classification::SubtitlesPresence => "Subtitles/Presence",
            Classification::VideoBitrate => "Video/Bitrate",
            Classification::VideoCodec => "Video/Codec",
            Classification::VideoResolution => "Video/Resolution",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One reported issue for one file: a classification plus a
/// human-readable message. Immutable once created; ownership moves to
/// the aggregator on submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub classification: Classification,
    pub message: CompactString,
}

impl Diagnostic {
    pub fn new(classification: Classification, message: impl Into<CompactString>) -> Self {
        Self {
            classification,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_is_display_priority() {
        assert!(Classification::FormatUnsupported < Classification::NamingForbidden);
        assert!(Classification::NamingForbidden < Classification::NamingMovie);
        assert!(Classification::SubtitlesPresence < Classification::VideoBitrate);
        assert!(Classification::VideoCodec < Classification::VideoResolution);
    }

    #[test]
    fn display_names_are_fixed() {
        assert_eq!(
            Classification::FormatUnsupported.to_string(),
            "Format/Unsupported"
        );
        assert_eq!(Classification::NamingTv.to_string(), "Naming/TV");
        assert_eq!(Classification::VideoBitrate.to_string(), "Video/Bitrate");
    }
}
