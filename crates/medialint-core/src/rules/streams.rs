//! Stream-metadata checks: bit rate, resolution, codec, subtitles.

use crate::probe::{StreamInfo, StreamKind};
use crate::report::{Classification, Diagnostic};
use crate::rules::{RuleConfig, MEBIBIT};

/// Check every stream of one file against the configured floors.
///
/// Video streams that are attached pictures (cover art) are skipped
/// entirely. Both floors are inclusive: a stream sitting exactly on
/// the floor is flagged. A bit rate of zero is treated as unknown and
/// never flagged.
pub(crate) fn check(config: &RuleConfig, streams: &[StreamInfo]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut subtitle_count = 0usize;

    for stream in streams {
        match stream.kind {
            StreamKind::Video if !stream.attached_picture => {
                if let Some(rate) = stream.bit_rate {
                    if rate != 0 && rate <= config.min_bit_rate {
                        diagnostics.push(Diagnostic::new(
                            Classification::VideoBitrate,
                            format!(
                                "{:.2} Mibps [track {}].",
                                rate as f64 / MEBIBIT as f64,
                                stream.index
                            ),
                        ));
                    }
                }

                let width = stream.width.unwrap_or(0);
                let height = stream.height.unwrap_or(0);
                if u64::from(width) * u64::from(height) <= config.min_pixel_count {
                    diagnostics.push(Diagnostic::new(
                        Classification::VideoResolution,
                        format!("{width}x{height} [track {}].", stream.index),
                    ));
                }

                if !config.allowed_codecs.iter().any(|c| *c == stream.codec) {
                    diagnostics.push(Diagnostic::new(
                        Classification::VideoCodec,
                        format!("{} [track {}].", stream.codec, stream.index),
                    ));
                }
            }
            StreamKind::Subtitle => subtitle_count += 1,
            _ => {}
        }
    }

    if subtitle_count == 0 {
        diagnostics.push(Diagnostic::new(
            Classification::SubtitlesPresence,
            "No subtitles found.",
        ));
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;

    fn video(index: usize, codec: &str, bit_rate: Option<u64>, w: u32, h: u32) -> StreamInfo {
        StreamInfo {
            index,
            kind: StreamKind::Video,
            attached_picture: false,
            bit_rate,
            width: Some(w),
            height: Some(h),
            codec: CompactString::from(codec),
        }
    }

    fn subtitle(index: usize) -> StreamInfo {
        StreamInfo {
            index,
            kind: StreamKind::Subtitle,
            attached_picture: false,
            bit_rate: None,
            width: None,
            height: None,
            codec: CompactString::from("subrip"),
        }
    }

    fn good_video(index: usize) -> StreamInfo {
        // Well above both floors, allowed codec.
        video(index, "h264", Some(8 * MEBIBIT), 1920, 1080)
    }

    fn messages_of(diagnostics: &[Diagnostic], class: Classification) -> Vec<String> {
        diagnostics
            .iter()
            .filter(|d| d.classification == class)
            .map(|d| d.message.to_string())
            .collect()
    }

    #[test]
    fn bitrate_floor_is_inclusive() {
        let config = RuleConfig::default();
        let at_floor = check(&config, &[video(0, "h264", Some(2 * MEBIBIT), 1920, 1080), subtitle(1)]);
        assert_eq!(
            messages_of(&at_floor, Classification::VideoBitrate),
            vec!["2.00 Mibps [track 0]."]
        );

        let above = check(&config, &[video(0, "h264", Some(2 * MEBIBIT + 1), 1920, 1080), subtitle(1)]);
        assert!(messages_of(&above, Classification::VideoBitrate).is_empty());
    }

    #[test]
    fn zero_bit_rate_means_unknown() {
        let config = RuleConfig::default();
        let found = check(&config, &[video(0, "h264", Some(0), 1920, 1080), subtitle(1)]);
        assert!(messages_of(&found, Classification::VideoBitrate).is_empty());

        let undeclared = check(&config, &[video(0, "h264", None, 1920, 1080), subtitle(1)]);
        assert!(messages_of(&undeclared, Classification::VideoBitrate).is_empty());
    }

    #[test]
    fn resolution_floor_is_inclusive() {
        let config = RuleConfig::default();
        let at_floor = check(&config, &[video(0, "h264", Some(8 * MEBIBIT), 1280, 720), subtitle(1)]);
        assert_eq!(
            messages_of(&at_floor, Classification::VideoResolution),
            vec!["1280x720 [track 0]."]
        );

        let above = check(&config, &[good_video(0), subtitle(1)]);
        assert!(messages_of(&above, Classification::VideoResolution).is_empty());
    }

    #[test]
    fn disallowed_codec_is_named_in_the_message() {
        let config = RuleConfig::default();
        let found = check(&config, &[video(0, "mpeg2video", Some(8 * MEBIBIT), 1920, 1080), subtitle(1)]);
        assert_eq!(
            messages_of(&found, Classification::VideoCodec),
            vec!["mpeg2video [track 0]."]
        );
    }

    #[test]
    fn all_four_modern_codecs_pass() {
        let config = RuleConfig::default();
        for codec in ["h264", "hevc", "vp9", "av1"] {
            let found = check(&config, &[video(0, codec, Some(8 * MEBIBIT), 1920, 1080), subtitle(1)]);
            assert!(found.is_empty(), "{codec} should pass every check");
        }
    }

    #[test]
    fn attached_pictures_are_skipped() {
        let config = RuleConfig::default();
        let cover = StreamInfo {
            attached_picture: true,
            ..video(1, "mjpeg", Some(1), 600, 882)
        };
        let found = check(&config, &[good_video(0), cover, subtitle(2)]);
        assert!(found.is_empty(), "cover art must not trip video checks");
    }

    #[test]
    fn missing_subtitles_are_flagged_once() {
        let config = RuleConfig::default();
        let found = check(&config, &[good_video(0)]);
        assert_eq!(
            messages_of(&found, Classification::SubtitlesPresence),
            vec!["No subtitles found."]
        );

        let with_subs = check(&config, &[good_video(0), subtitle(1)]);
        assert!(messages_of(&with_subs, Classification::SubtitlesPresence).is_empty());
    }

    #[test]
    fn track_index_is_the_container_index() {
        let config = RuleConfig::default();
        // The offending video sits at container index 3.
        let found = check(
            &config,
            &[good_video(0), subtitle(1), subtitle(2), video(3, "h264", Some(MEBIBIT), 1920, 1080)],
        );
        assert_eq!(
            messages_of(&found, Classification::VideoBitrate),
            vec!["1.00 Mibps [track 3]."]
        );
    }
}
