//! `yt-dlp` subprocess backend

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use serde::Deserialize;

use super::formats::{RawFormat, VideoFormat};
use super::{Materializer, MetadataResolver, Quality, VideoInfo};
use crate::{Error, Result};

/// Characters of stderr kept in resolver errors
const STDERR_TAIL_CHARS: usize = 300;

/// The subset of `--dump-json` output needed to list formats
#[derive(Deserialize)]
struct FormatDump {
    #[serde(default)]
    title: String,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

/// Media resolver backed by the `yt-dlp` CLI
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    download_dir: PathBuf,
}

impl YtDlp {
    /// Create a resolver that runs `program` and downloads into `download_dir`
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            download_dir: download_dir.into(),
        }
    }

    /// Directory materialized files are written to
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Whether the configured program can be found and executed
    #[must_use]
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Run the tool and return its output on a zero exit status
    async fn run(&self, args: &[&str]) -> Result<Output> {
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::Resolver(format!("failed to run {}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Resolver(format!(
                "{} exited with code {}: {}",
                self.program.display(),
                output.status.code().unwrap_or(-1),
                stderr_tail(&stderr)
            )));
        }

        Ok(output)
    }

    /// List the formats the source offers
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolver` if the tool fails or prints unexpected output
    pub async fn list_formats(&self, url: &str) -> Result<(String, Vec<VideoFormat>)> {
        let output = self.run(&["--dump-json", "--no-playlist", "--", url]).await?;
        let dump: FormatDump = parse_first_json(&output.stdout)?;
        let formats = dump.formats.into_iter().map(VideoFormat::from).collect();
        Ok((dump.title, formats))
    }

    /// Local path a materialized file for `info` at `quality` ends up at
    #[must_use]
    pub fn target_path(&self, info: &VideoInfo, quality: Quality) -> PathBuf {
        self.download_dir
            .join(format!("{}.{}", sanitize_id(&info.id), quality.extension))
    }
}

#[async_trait]
impl MetadataResolver for YtDlp {
    async fn resolve(&self, url: &str) -> Result<VideoInfo> {
        let output = self.run(&["--dump-json", "--no-playlist", "--", url]).await?;
        let info: VideoInfo = parse_first_json(&output.stdout)?;
        if info.id.trim().is_empty() {
            return Err(Error::Resolver("media tool returned no video id".to_string()));
        }
        tracing::debug!(id = %info.id, title = %info.title, duration = info.duration, "resolved video info");
        Ok(info)
    }
}

#[async_trait]
impl Materializer for YtDlp {
    async fn materialize(&self, url: &str, info: &VideoInfo, quality: Quality) -> Result<PathBuf> {
        let target = self.target_path(info, quality);
        let template = self
            .download_dir
            .join(format!("{}.%(ext)s", sanitize_id(&info.id)));
        let template = template.to_string_lossy().into_owned();

        tracing::info!(id = %info.id, format = quality.format_id, target = %target.display(), "starting download");

        let result = self
            .run(&[
                "-f",
                quality.format_id,
                "--no-playlist",
                "--no-part",
                "-o",
                template.as_str(),
                "--",
                url,
            ])
            .await;

        if let Err(e) = result {
            remove_partial(&target).await;
            return Err(e);
        }

        if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Err(Error::Resolver(format!(
                "download finished but {} is missing",
                target.display()
            )));
        }

        Ok(target)
    }
}

/// Best-effort removal of a file left behind by a failed download
async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "removed partial download"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove partial download"),
    }
}

/// Parse the first JSON document on stdout (playlists print one per line)
fn parse_first_json<T: serde::de::DeserializeOwned>(stdout: &[u8]) -> Result<T> {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| Error::Resolver("no output from media tool".to_string()))?;

    serde_json::from_str(line).map_err(|e| Error::Resolver(format!("failed to parse video info: {e}")))
}

/// Keep ids usable as file names
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= STDERR_TAIL_CHARS {
        trimmed.to_string()
    } else {
        trimmed.chars().skip(count - STDERR_TAIL_CHARS).collect()
    }
}
