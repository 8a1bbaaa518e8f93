//! Media resolution
//!
//! The dispatcher only sees the `MetadataResolver` and `Materializer`
//! capabilities; `YtDlp` implements both by shelling out to `yt-dlp`.

pub mod formats;
mod ytdlp;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

pub use formats::{VideoFormat, filter_mobile_friendly, format_message, format_size};
pub use ytdlp::YtDlp;

use crate::Result;

/// Host substrings a URL must contain to be accepted
const HOST_MARKERS: &[&str] = &["youtube.com", "youtu.be"];

/// Whether `url` looks like a supported media link
///
/// Deliberately shallow: non-empty and containing a known host marker.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    !url.is_empty() && HOST_MARKERS.iter().any(|marker| url.contains(marker))
}

/// Basic metadata for a video
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Length in whole seconds
    #[serde(default, deserialize_with = "whole_seconds")]
    pub duration: u64,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "webpage_url")]
    pub url: Option<String>,
}

/// yt-dlp reports duration as an integer or a float depending on extractor
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|d| d.is_finite() && *d > 0.0).map_or(0, |d| d as u64))
}

/// A quality tier the downloader can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality {
    /// Source-platform format selector
    pub format_id: &'static str,
    /// File extension the format produces
    pub extension: &'static str,
    /// Human label
    pub label: &'static str,
}

impl Quality {
    /// Combined audio+video 360p mp4, small enough for most uploads
    pub const MOBILE_360P: Self = Self {
        format_id: "18",
        extension: "mp4",
        label: "360p",
    };
}

/// Resolve metadata for a media URL
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Look up id, title, duration and uploader
    async fn resolve(&self, url: &str) -> Result<VideoInfo>;
}

/// Download media to a local file
#[async_trait]
pub trait Materializer: Send + Sync {
    /// Fetch `url` at `quality` and return the path of the local file
    ///
    /// The file is named from `info.id`; the caller owns it afterwards.
    async fn materialize(&self, url: &str, info: &VideoInfo, quality: Quality) -> Result<PathBuf>;
}
