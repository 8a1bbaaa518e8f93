//! clip-relay - Telegram bot that fetches videos with `yt-dlp`
//!
//! Updates arrive either by long-polling `getUpdates` or by Telegram pushing
//! them to a webhook. Each message goes through one dispatcher, which answers
//! commands and runs the download workflow for video links.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   Daemon                      │
//! │   polling loop   │   webhook listener (api)   │
//! └────────────────────┬─────────────────────────┘
//!                      │ Message
//! ┌────────────────────▼─────────────────────────┐
//! │                 Dispatcher                    │
//! │   commands  │  replies  │  download workflow  │
//! └──────────┬─────────────────────┬─────────────┘
//!            │                     │
//! ┌──────────▼─────────┐ ┌─────────▼────────────┐
//! │ Transport          │ │ MetadataResolver /   │
//! │ (Telegram Bot API) │ │ Materializer (yt-dlp)│
//! └────────────────────┘ └──────────────────────┘
//! ```

pub mod api;
pub mod channels;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod error;
pub mod media;

pub use config::{Config, RunMode};
pub use daemon::Daemon;
pub use dispatch::{Command, Dispatcher};
pub use error::{Error, Result};
