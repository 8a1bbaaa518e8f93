//! Messaging platform transport
//!
//! The `Transport` trait is the seam between the dispatcher / ingestion loop
//! and the platform's HTTP API, so both can run against a fake in tests.

pub mod telegram;

use std::path::Path;

use async_trait::async_trait;

pub use telegram::{Chat, Message, TelegramClient, Update, User, WebhookInfo};

use crate::Result;

/// Outbound capability set of the messaging platform
///
/// Every call either succeeds or fails with a transport-level error
/// (`Error::Http` / `Error::Channel`) or a platform-reported one (`Error::Api`).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Look up the bot's own identity
    async fn get_me(&self) -> Result<User>;

    /// Fetch the next batch of updates with `update_id >= offset`
    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>>;

    /// Send a text message to a chat
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Upload a local file to a chat
    async fn send_file(&self, chat_id: i64, path: &Path) -> Result<()>;

    /// Register the externally reachable callback URL
    async fn register_callback(&self, url: &str) -> Result<()>;

    /// Remove any registered callback URL
    async fn deregister_callback(&self) -> Result<()>;

    /// Introspect the current callback registration
    async fn callback_info(&self) -> Result<WebhookInfo>;
}
