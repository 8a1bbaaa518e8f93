//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use clip_relay::channels::{Chat, Message, Transport, Update, User, WebhookInfo};
use clip_relay::dispatch::{DispatchOptions, Dispatcher};
use clip_relay::media::{Materializer, MetadataResolver, Quality, VideoInfo};
use clip_relay::{Error, Result};
use tokio::sync::Mutex;

/// Something the bot sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    File { chat_id: i64, path: PathBuf, existed: bool },
}

/// Transport fake that records outbound calls and replays scripted batches
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    batches: Mutex<VecDeque<Result<Vec<Update>>>>,
    offsets: Mutex<Vec<i64>>,
    callbacks: Mutex<Vec<Option<String>>>,
    fail_get_me: bool,
    fail_upload: bool,
    fail_register: bool,
    fail_deregister: bool,
    /// Fail any text send whose body contains this
    fail_text_containing: Option<String>,
    polls: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// `getMe` is rejected as unauthorized
    pub fn failing_identity() -> Self {
        Self {
            fail_get_me: true,
            ..Self::default()
        }
    }

    /// Every `send_file` is rejected
    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    /// `setWebhook` is rejected
    pub fn failing_register() -> Self {
        Self {
            fail_register: true,
            ..Self::default()
        }
    }

    /// `deleteWebhook` is rejected
    pub fn failing_deregister() -> Self {
        Self {
            fail_deregister: true,
            ..Self::default()
        }
    }

    /// Text sends containing `needle` fail at the transport level
    pub fn failing_text(needle: &str) -> Self {
        Self {
            fail_text_containing: Some(needle.to_string()),
            ..Self::default()
        }
    }

    /// Queue one `getUpdates` result; once the queue drains, polls return empty batches
    pub async fn push_batch(&self, batch: Result<Vec<Update>>) {
        self.batches.lock().await.push_back(batch);
    }

    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text.clone()),
                Sent::File { .. } => None,
            })
            .collect()
    }

    pub async fn files(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|s| matches!(s, Sent::File { .. }))
            .cloned()
            .collect()
    }

    /// Offsets passed to `get_updates`, in call order
    pub async fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().await.clone()
    }

    /// Webhook registrations in call order, `None` for a deregistration
    pub async fn callbacks(&self) -> Vec<Option<String>> {
        self.callbacks.lock().await.clone()
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get_me(&self) -> Result<User> {
        if self.fail_get_me {
            return Err(Error::Api {
                method: "getMe",
                description: "Unauthorized".to_string(),
            });
        }
        Ok(User {
            id: 1,
            is_bot: true,
            first_name: "Clip".to_string(),
            username: Some("clip_bot".to_string()),
            ..User::default()
        })
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.offsets.lock().await.push(offset);
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        if let Some(needle) = &self.fail_text_containing
            && text.contains(needle.as_str())
        {
            return Err(Error::Channel("Telegram sendMessage error: connection reset".to_string()));
        }
        self.sent.lock().await.push(Sent::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_file(&self, chat_id: i64, path: &Path) -> Result<()> {
        self.sent.lock().await.push(Sent::File {
            chat_id,
            path: path.to_path_buf(),
            existed: path.exists(),
        });
        if self.fail_upload {
            return Err(Error::Api {
                method: "sendDocument",
                description: "Request Entity Too Large".to_string(),
            });
        }
        Ok(())
    }

    async fn register_callback(&self, url: &str) -> Result<()> {
        self.callbacks.lock().await.push(Some(url.to_string()));
        if self.fail_register {
            return Err(Error::Api {
                method: "setWebhook",
                description: "bad webhook: HTTPS url must be provided for webhook".to_string(),
            });
        }
        Ok(())
    }

    async fn deregister_callback(&self) -> Result<()> {
        self.callbacks.lock().await.push(None);
        if self.fail_deregister {
            return Err(Error::Channel("Telegram deleteWebhook error: timed out".to_string()));
        }
        Ok(())
    }

    async fn callback_info(&self) -> Result<WebhookInfo> {
        let url = self
            .callbacks
            .lock()
            .await
            .last()
            .cloned()
            .flatten()
            .unwrap_or_default();
        Ok(WebhookInfo {
            url,
            ..WebhookInfo::default()
        })
    }
}

/// Resolver returning fixed metadata, or failing when `info` is `None`
pub struct StubResolver {
    pub info: Option<VideoInfo>,
    calls: AtomicUsize,
}

impl StubResolver {
    pub fn returning(info: VideoInfo) -> Self {
        Self {
            info: Some(info),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            info: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataResolver for StubResolver {
    async fn resolve(&self, _url: &str) -> Result<VideoInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.info
            .clone()
            .ok_or_else(|| Error::Resolver("ERROR: Video unavailable".to_string()))
    }
}

/// Materializer writing a file of `size` bytes into `dir`
pub struct StubMaterializer {
    pub dir: PathBuf,
    pub size: usize,
    pub fail: bool,
    written: Mutex<Option<PathBuf>>,
}

impl StubMaterializer {
    pub fn new(dir: &Path, size: usize) -> Self {
        Self {
            dir: dir.to_path_buf(),
            size,
            fail: false,
            written: Mutex::new(None),
        }
    }

    pub fn failing(dir: &Path) -> Self {
        Self {
            fail: true,
            ..Self::new(dir, 0)
        }
    }

    /// Path of the last file written
    pub async fn written(&self) -> Option<PathBuf> {
        self.written.lock().await.clone()
    }
}

#[async_trait]
impl Materializer for StubMaterializer {
    async fn materialize(&self, _url: &str, info: &VideoInfo, quality: Quality) -> Result<PathBuf> {
        if self.fail {
            return Err(Error::Resolver("yt-dlp exited with code 1".to_string()));
        }
        let path = self.dir.join(format!("{}.{}", info.id, quality.extension));
        tokio::fs::write(&path, vec![0u8; self.size]).await?;
        *self.written.lock().await = Some(path.clone());
        Ok(path)
    }
}

pub fn sample_video() -> VideoInfo {
    VideoInfo {
        id: "dQw4w9WgXcQ".to_string(),
        title: "Never Gonna Give You Up".to_string(),
        duration: 212,
        uploader: Some("Rick Astley".to_string()),
        ..VideoInfo::default()
    }
}

/// Private-chat text message from a user named Ada
pub fn text_message(chat_id: i64, text: &str) -> Message {
    Message {
        message_id: 1,
        from: Some(User {
            id: chat_id,
            first_name: "Ada".to_string(),
            ..User::default()
        }),
        chat: Chat {
            id: chat_id,
            chat_type: "private".to_string(),
            ..Chat::default()
        },
        date: 1_700_000_000,
        text: Some(text.to_string()),
    }
}

pub fn update(update_id: i64, text: Option<&str>) -> Update {
    Update {
        update_id,
        message: text.map(|t| text_message(100, t)),
    }
}

/// Dispatcher over the given fakes
pub fn dispatcher(
    transport: Arc<RecordingTransport>,
    resolver: Arc<StubResolver>,
    materializer: Arc<StubMaterializer>,
    options: DispatchOptions,
) -> Dispatcher {
    Dispatcher::new(transport, resolver, materializer, options)
}
