//! TOML configuration file loading
//!
//! Supports `~/.config/clip-relay/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::RunMode;
use crate::Result;
use crate::dispatch::PlainTextReply;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Telegram settings
    #[serde(default)]
    pub telegram: TelegramFileConfig,

    /// Listener settings
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Downloader settings
    #[serde(default)]
    pub media: MediaFileConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct TelegramFileConfig {
    pub bot_token: Option<String>,

    /// Bot API base, `https://api.telegram.org/bot` when unset
    pub api_base: Option<String>,

    /// Milliseconds between polling batches
    pub poll_interval_ms: Option<u64>,

    /// Milliseconds to wait after a failed poll
    pub error_backoff_ms: Option<u64>,

    /// Reply mode for plain text
    pub plain_text_reply: Option<PlainTextReply>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub mode: Option<RunMode>,
    pub port: Option<u16>,

    /// Public base URL Telegram pushes to, `/webhook` is appended
    pub webhook_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaFileConfig {
    /// Path to the `yt-dlp` executable
    pub ytdlp_path: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
}

/// Load an explicitly requested config file
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed
pub fn load_from(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::Config(format!("failed to read config file {}: {e}", path.display()))
    })?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/clip-relay/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("clip-relay").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn parses_partial_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            [server]
            mode = "webhook"
            webhook_url = "https://bot.example.com"

            [telegram]
            plain_text_reply = "echo"
            "#,
        )
        .unwrap();

        assert_eq!(file.server.mode, Some(RunMode::Webhook));
        assert_eq!(file.server.port, None);
        assert_eq!(file.telegram.plain_text_reply, Some(PlainTextReply::Echo));
        assert!(file.media.download_dir.is_none());
    }

    #[test]
    fn empty_file_is_default() {
        let file: ConfigFile = toml::from_str("").unwrap();
        assert!(file.telegram.bot_token.is_none());
        assert!(file.server.mode.is_none());
    }

    #[test]
    fn load_from_reports_bad_toml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"[server\nport = ").unwrap();
        let err = load_from(tmp.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Toml(_)));
    }

    #[test]
    fn load_from_missing_file_is_config_error() {
        let err = load_from(Path::new("/nonexistent/clip-relay.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
