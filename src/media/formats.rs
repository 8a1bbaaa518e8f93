//! Format listing helpers

use std::fmt::Write as _;

use serde::Deserialize;

/// Resolutions considered mobile-friendly, in ascending order
const MOBILE_QUALITIES: &[(&str, u32)] = &[
    ("360p", 360),
    ("480p", 480),
    ("720p", 720),
    ("1080p", 1080),
];

/// One downloadable encoding of a video
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFormat {
    pub format_id: String,
    /// Resolution label such as `720p`, or `audio` for audio-only formats
    pub quality: String,
    pub extension: String,
    /// Size in bytes, 0 when unknown
    pub file_size: u64,
    pub has_video: bool,
    pub has_audio: bool,
}

/// Format entry as it appears in `yt-dlp --dump-json` output
#[derive(Debug, Deserialize)]
pub(crate) struct RawFormat {
    format_id: String,
    #[serde(default)]
    ext: String,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    filesize: Option<u64>,
    #[serde(default)]
    filesize_approx: Option<u64>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
}

impl From<RawFormat> for VideoFormat {
    fn from(raw: RawFormat) -> Self {
        let has_codec = |codec: &Option<String>| codec.as_deref().is_some_and(|c| c != "none");
        let has_video = has_codec(&raw.vcodec);
        let has_audio = has_codec(&raw.acodec);

        let quality = match raw.height {
            Some(h) if has_video => format!("{h}p"),
            _ if has_audio => "audio".to_string(),
            _ => "unknown".to_string(),
        };

        Self {
            format_id: raw.format_id,
            quality,
            extension: raw.ext,
            file_size: raw.filesize.or(raw.filesize_approx).unwrap_or(0),
            has_video,
            has_audio,
        }
    }
}

fn mobile_rank(quality: &str) -> Option<u32> {
    MOBILE_QUALITIES
        .iter()
        .find(|(label, _)| *label == quality)
        .map(|(_, rank)| *rank)
}

/// Keep combined audio+video mp4 formats at mobile-friendly resolutions,
/// sorted from lowest to highest resolution
#[must_use]
pub fn filter_mobile_friendly(formats: &[VideoFormat]) -> Vec<VideoFormat> {
    let mut mobile: Vec<VideoFormat> = formats
        .iter()
        .filter(|f| f.has_video && f.has_audio && f.extension == "mp4")
        .filter(|f| mobile_rank(&f.quality).is_some())
        .cloned()
        .collect();

    mobile.sort_by_key(|f| mobile_rank(&f.quality));
    mobile
}

/// Human-readable size using decimal units
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1000;
    const MB: u64 = KB * 1000;
    const GB: u64 = MB * 1000;

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    }
}

/// List formats for display
#[must_use]
pub fn format_message(title: &str, formats: &[VideoFormat]) -> String {
    if formats.is_empty() {
        return "No mobile-friendly formats available for this video.".to_string();
    }

    let mut out = format!("📱 {title}\n\nAvailable mobile-friendly formats:\n\n");
    for (i, format) in formats.iter().enumerate() {
        let size = if format.file_size > 0 {
            format_size(format.file_size)
        } else {
            "Unknown size".to_string()
        };
        let _ = writeln!(
            out,
            "{}. {} - {size} ({})",
            i + 1,
            format.quality,
            format.extension
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(id: &str, quality: &str, ext: &str, size: u64, video: bool, audio: bool) -> VideoFormat {
        VideoFormat {
            format_id: id.to_string(),
            quality: quality.to_string(),
            extension: ext.to_string(),
            file_size: size,
            has_video: video,
            has_audio: audio,
        }
    }

    #[test]
    fn filters_to_combined_mp4_sorted() {
        let all = vec![
            format("22", "720p", "mp4", 150_000_000, true, true),
            format("18", "360p", "mp4", 50_000_000, true, true),
            format("137", "1080p", "mp4", 300_000_000, true, false),
            format("140", "audio", "m4a", 20_000_000, false, true),
            format("251", "audio", "webm", 25_000_000, false, true),
            format("43", "360p", "webm", 40_000_000, true, true),
        ];

        let mobile = filter_mobile_friendly(&all);
        let ids: Vec<&str> = mobile.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["18", "22"]);
    }

    #[test]
    fn sizes_use_decimal_units() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1500), "1.5 KB");
        assert_eq!(format_size(50_000_000), "50.0 MB");
        assert_eq!(format_size(1_500_000_000), "1.5 GB");
    }

    #[test]
    fn message_lists_each_format() {
        let formats = vec![
            format("18", "360p", "mp4", 50_000_000, true, true),
            format("22", "720p", "mp4", 150_000_000, true, true),
        ];
        let message = format_message("Test Video", &formats);
        for expected in ["Test Video", "360p", "720p", "50.0 MB", "150.0 MB"] {
            assert!(message.contains(expected), "missing {expected} in {message}");
        }
    }

    #[test]
    fn message_for_no_formats() {
        assert_eq!(
            format_message("Anything", &[]),
            "No mobile-friendly formats available for this video."
        );
    }

    #[test]
    fn raw_format_conversion() {
        let raw: RawFormat = serde_json::from_str(
            r#"{"format_id": "18", "ext": "mp4", "height": 360, "filesize_approx": 1234, "vcodec": "avc1.42001E", "acodec": "mp4a.40.2"}"#,
        )
        .unwrap();
        let format = VideoFormat::from(raw);
        assert_eq!(format.quality, "360p");
        assert_eq!(format.file_size, 1234);
        assert!(format.has_video && format.has_audio);

        let audio: RawFormat = serde_json::from_str(
            r#"{"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2"}"#,
        )
        .unwrap();
        let audio = VideoFormat::from(audio);
        assert_eq!(audio.quality, "audio");
        assert!(!audio.has_video);
    }
}
