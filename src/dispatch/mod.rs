//! Command dispatch
//!
//! Turns one inbound message into replies. The dispatcher holds no per-chat
//! state; every side effect goes through the `Transport` or the media traits,
//! so handling the same message twice produces the same replies.

mod command;
mod download;
pub mod replies;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

pub use command::Command;
pub use download::LocalFile;
pub use replies::format_duration;

use crate::channels::{Message, Transport};
use crate::media::{Materializer, MetadataResolver, Quality};
use crate::{Error, Result};

/// Telegram's upload ceiling for bots
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// How non-command, non-link text is answered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlainTextReply {
    /// Point the user at what the bot can do
    #[default]
    Guide,
    /// Repeat the text back
    Echo,
}

impl FromStr for PlainTextReply {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guide" => Ok(Self::Guide),
            "echo" => Ok(Self::Echo),
            other => Err(Error::Config(format!(
                "invalid plain text reply mode '{other}', expected 'guide' or 'echo'"
            ))),
        }
    }
}

impl fmt::Display for PlainTextReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Guide => "guide",
            Self::Echo => "echo",
        })
    }
}

/// Dispatcher behaviour knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    pub plain_text: PlainTextReply,
    /// Files larger than this are not uploaded
    pub max_upload_bytes: u64,
    pub quality: Quality,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            plain_text: PlainTextReply::default(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            quality: Quality::MOBILE_360P,
        }
    }
}

/// Maps messages to actions
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn MetadataResolver>,
    materializer: Arc<dyn Materializer>,
    options: DispatchOptions,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        resolver: Arc<dyn MetadataResolver>,
        materializer: Arc<dyn Materializer>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            transport,
            resolver,
            materializer,
            options,
        }
    }

    /// Handle one inbound message
    ///
    /// # Errors
    ///
    /// Returns error if a reply cannot be delivered. Media failures are
    /// answered in chat and do not surface here.
    pub async fn handle_message(&self, message: &Message) -> Result<()> {
        let Some(command) = Command::parse(message.text()) else {
            return Ok(());
        };

        let chat_id = message.chat.id;
        tracing::debug!(chat_id, command = command.name(), "dispatching message");

        match command {
            Command::Start => {
                let name = message.from.as_ref().map_or("there", |u| u.first_name.as_str());
                self.reply(chat_id, &replies::welcome(name)).await
            }
            Command::Help => self.reply(chat_id, replies::HELP).await,
            Command::Echo(text) if text.is_empty() => self.reply(chat_id, replies::ECHO_USAGE).await,
            Command::Echo(text) => self.reply(chat_id, &text).await,
            Command::Download(url) if url.is_empty() => {
                self.reply(chat_id, replies::DOWNLOAD_USAGE).await
            }
            Command::Download(url) => self.download(chat_id, &url).await,
            Command::PlainText(text) => match self.options.plain_text {
                PlainTextReply::Guide => self.reply(chat_id, replies::GUIDANCE).await,
                PlainTextReply::Echo => self.reply(chat_id, &text).await,
            },
            Command::Unknown => self.reply(chat_id, replies::UNKNOWN_COMMAND).await,
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<()> {
        self.transport.send_text(chat_id, text).await
    }
}
