//! Error types for clip-relay

use thiserror::Error;

/// Result type alias for clip-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in clip-relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to the messaging platform
    #[error("channel error: {0}")]
    Channel(String),

    /// Well-formed response in which the platform rejected the call
    #[error("Telegram {method} failed: {description}")]
    Api {
        /// Bot API method name (e.g. `setWebhook`)
        method: &'static str,
        /// Description text reported by the platform
        description: String,
    },

    /// External media tool failure (opaque)
    #[error("resolver error: {0}")]
    Resolver(String),

    /// Malformed or unrecognized user input
    #[error("validation error: {0}")]
    Validation(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether the failure happened before a well-formed platform response
    /// was received (network, HTTP status, undecodable body)
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Channel(_) | Self::Http(_) | Self::Serialization(_))
    }
}
