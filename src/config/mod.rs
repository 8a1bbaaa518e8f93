//! Configuration management for clip-relay
//!
//! Precedence, highest first: CLI flags (applied by the binary), environment
//! variables, the TOML file, built-in defaults.

pub mod file;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use self::file::ConfigFile;
use crate::channels::telegram::PollingOptions;
use crate::dispatch::PlainTextReply;
use crate::{Error, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_ERROR_BACKOFF_MS: u64 = 1000;

/// How updates reach the bot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Pull updates with `getUpdates`
    #[default]
    Polling,
    /// Receive pushed updates on `POST /webhook`
    Webhook,
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "polling" => Ok(Self::Polling),
            "webhook" => Ok(Self::Webhook),
            other => Err(Error::Config(format!(
                "invalid mode '{other}', use 'polling' or 'webhook'"
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Polling => "polling",
            Self::Webhook => "webhook",
        })
    }
}

/// clip-relay configuration
#[derive(Clone)]
pub struct Config {
    /// Bot token from `@BotFather`
    pub telegram_token: String,

    /// Bot API base URL override (tests, local Bot API servers)
    pub telegram_api_base: Option<String>,

    pub mode: RunMode,

    /// Port the webhook listener binds
    pub port: u16,

    /// Public base URL for webhook registration
    pub webhook_url: Option<String>,

    pub ytdlp_path: PathBuf,
    pub download_dir: PathBuf,

    pub poll_interval: Duration,
    pub error_backoff: Duration,

    pub plain_text_reply: PlainTextReply,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"[redacted]")
            .field("telegram_api_base", &self.telegram_api_base)
            .field("mode", &self.mode)
            .field("port", &self.port)
            .field("webhook_url", &self.webhook_url)
            .field("ytdlp_path", &self.ytdlp_path)
            .field("download_dir", &self.download_dir)
            .field("poll_interval", &self.poll_interval)
            .field("error_backoff", &self.error_backoff)
            .field("plain_text_reply", &self.plain_text_reply)
            .finish()
    }
}

impl Config {
    /// Load configuration from the config file and the process environment
    ///
    /// `path` names an explicit TOML file; without it the platform config
    /// directory is consulted and a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit file is unreadable or a value is malformed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = match path {
            Some(path) => file::load_from(path)?,
            None => file::load_config_file(),
        };

        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with environment lookups (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if an environment value cannot be parsed
    pub fn from_sources<F>(fc: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let mode = env("MODE")
            .map(|v| v.parse::<RunMode>())
            .transpose()?
            .or(fc.server.mode)
            .unwrap_or_default();

        let port = env("PORT")
            .map(|v| parse_number::<u16>("PORT", &v))
            .transpose()?
            .or(fc.server.port)
            .unwrap_or(DEFAULT_PORT);

        let poll_interval_ms = env("POLL_INTERVAL_MS")
            .map(|v| parse_number::<u64>("POLL_INTERVAL_MS", &v))
            .transpose()?
            .or(fc.telegram.poll_interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        let plain_text_reply = env("PLAIN_TEXT_REPLY")
            .map(|v| v.parse::<PlainTextReply>())
            .transpose()?
            .or(fc.telegram.plain_text_reply)
            .unwrap_or_default();

        Ok(Self {
            telegram_token: env("TELEGRAM_BOT_TOKEN")
                .or(fc.telegram.bot_token)
                .unwrap_or_default(),
            telegram_api_base: env("TELEGRAM_API_BASE").or(fc.telegram.api_base),
            mode,
            port,
            webhook_url: env("WEBHOOK_URL").or(fc.server.webhook_url),
            ytdlp_path: env("YTDLP_PATH")
                .map(PathBuf::from)
                .or(fc.media.ytdlp_path)
                .unwrap_or_else(|| PathBuf::from("yt-dlp")),
            download_dir: env("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .or(fc.media.download_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            poll_interval: Duration::from_millis(poll_interval_ms),
            error_backoff: Duration::from_millis(
                fc.telegram.error_backoff_ms.unwrap_or(DEFAULT_ERROR_BACKOFF_MS),
            ),
            plain_text_reply,
        })
    }

    /// Check that the values needed to start are present
    ///
    /// # Errors
    ///
    /// Returns error if the token is missing, or if webhook mode lacks a
    /// usable public URL
    pub fn validate(&self) -> Result<()> {
        if self.telegram_token.trim().is_empty() {
            return Err(Error::Config("TELEGRAM_BOT_TOKEN is not set".to_string()));
        }

        if self.mode == RunMode::Webhook {
            let Some(raw) = self.webhook_url.as_deref() else {
                return Err(Error::Config(
                    "WEBHOOK_URL must be set for webhook mode".to_string(),
                ));
            };

            let parsed = url::Url::parse(raw)
                .map_err(|e| Error::Config(format!("invalid WEBHOOK_URL '{raw}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "WEBHOOK_URL must be an http(s) URL, got '{raw}'"
                )));
            }
        }

        Ok(())
    }

    /// Full URL Telegram should push updates to
    #[must_use]
    pub fn webhook_endpoint(&self) -> Option<String> {
        self.webhook_url
            .as_deref()
            .map(|base| format!("{}/webhook", base.trim_end_matches('/')))
    }

    /// Timing for the polling loop
    #[must_use]
    pub const fn polling_options(&self) -> PollingOptions {
        PollingOptions {
            idle_interval: self.poll_interval,
            error_backoff: self.error_backoff,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid {key} '{value}': {e}")))
}
