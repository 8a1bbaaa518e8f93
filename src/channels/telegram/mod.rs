//! Telegram channel adapter
//!
//! Bot API client plus the `getUpdates` polling loop. Webhook pushes are
//! received by the HTTP server in `crate::api`.

mod api;
pub mod polling;
pub mod types;

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;

pub use polling::{PollingOptions, advance_cursor, run_polling};
pub use types::{API_BASE, Chat, Message, Update, User, WebhookInfo};

use super::Transport;
use crate::Result;

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    token: String,
    api_base: String,
    client: Client,
}

impl TelegramClient {
    /// Create a client for the public Bot API
    #[must_use]
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, API_BASE.to_string())
    }

    /// Create a client against a custom API base (self-hosted Bot API server,
    /// or a mock server in tests). `api_base` is the prefix the token is
    /// appended to, e.g. `https://api.telegram.org/bot`.
    #[must_use]
    pub fn with_api_base(token: String, api_base: String) -> Self {
        Self {
            token,
            api_base,
            client: Client::new(),
        }
    }

    /// Full URL for a Bot API method
    fn method_url(&self, method: &str) -> String {
        format!("{}{}/{method}", self.api_base, self.token)
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn get_me(&self) -> Result<User> {
        self.get_me().await
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.get_updates(offset).await
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await
    }

    async fn send_file(&self, chat_id: i64, path: &Path) -> Result<()> {
        self.send_document(chat_id, path).await
    }

    async fn register_callback(&self, url: &str) -> Result<()> {
        self.set_webhook(url).await
    }

    async fn deregister_callback(&self) -> Result<()> {
        self.delete_webhook().await
    }

    async fn callback_info(&self) -> Result<WebhookInfo> {
        self.get_webhook_info().await
    }
}
