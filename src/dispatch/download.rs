//! Download workflow

use std::path::{Path, PathBuf};

use super::{Dispatcher, replies};
use crate::Result;
use crate::media::is_valid_url;

/// Owns a materialized file and removes it when dropped
///
/// Removal happens once, whichever way the workflow exits. Failures are
/// logged and otherwise ignored.
#[derive(Debug)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size on disk, `None` if the file cannot be inspected
    pub async fn size(&self) -> Option<u64> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Some(meta.len()),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to stat downloaded file");
                None
            }
        }
    }
}

impl Drop for LocalFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed downloaded file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove downloaded file");
            }
        }
    }
}

impl Dispatcher {
    /// Resolve, fetch and upload the media behind `url`
    ///
    /// Every failure after validation ends in exactly one user-facing reply.
    /// Only failures to deliver progress messages propagate.
    pub(super) async fn download(&self, chat_id: i64, url: &str) -> Result<()> {
        let url = url.trim();

        // A leading dash would reach the media tool as an option
        if !is_valid_url(url) || url.starts_with('-') {
            tracing::debug!(chat_id, url, "rejected download url");
            return self.reply(chat_id, replies::INVALID_URL).await;
        }

        self.reply(chat_id, replies::FETCHING_INFO).await?;

        let info = match self.resolver.resolve(url).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(chat_id, url, error = %e, "failed to resolve video info");
                return self.reply(chat_id, replies::INFO_FAILED).await;
            }
        };

        tracing::info!(chat_id, id = %info.id, title = %info.title, duration = info.duration, "video resolved");

        let quality = self.options.quality;
        self.reply(chat_id, &replies::starting_download(&info, quality.label))
            .await?;

        let file = match self.materializer.materialize(url, &info, quality).await {
            Ok(path) => LocalFile::new(path),
            Err(e) => {
                tracing::warn!(chat_id, id = %info.id, error = %e, "download failed");
                return self.reply(chat_id, replies::DOWNLOAD_FAILED).await;
            }
        };

        if let Some(size) = file.size().await
            && size > self.options.max_upload_bytes
        {
            tracing::info!(
                chat_id,
                id = %info.id,
                size,
                limit = self.options.max_upload_bytes,
                "downloaded file exceeds upload limit"
            );
            drop(file);
            return self.reply(chat_id, replies::TOO_LARGE).await;
        }

        self.reply(chat_id, replies::UPLOADING).await?;

        if let Err(e) = self.transport.send_file(chat_id, file.path()).await {
            tracing::warn!(chat_id, path = %file.path().display(), error = %e, "upload failed");
            drop(file);
            return self.reply(chat_id, replies::UPLOAD_FAILED).await;
        }

        drop(file);
        tracing::info!(chat_id, id = %info.id, "video delivered");
        self.reply(chat_id, replies::SENT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"data").unwrap();

        let guard = LocalFile::new(path.clone());
        assert!(path.exists());
        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn guard_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        drop(LocalFile::new(dir.path().join("never-written.mp4")));
    }

    #[tokio::test]
    async fn size_reports_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![0u8; 1234]).unwrap();

        let guard = LocalFile::new(path);
        assert_eq!(guard.size().await, Some(1234));
    }
}
