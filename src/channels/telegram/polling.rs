//! Telegram polling mode: the `getUpdates` loop
//!
//! The cursor is owned by the polling task: it starts at zero on every
//! process start, is passed to each `getUpdates` call and is reassigned to
//! `update_id + 1` right after each update is consumed. A crash mid-batch
//! therefore redelivers the remainder (at-least-once).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::types::Update;
use crate::channels::Transport;
use crate::dispatch::Dispatcher;

/// Pause between successful batches
const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(1);

/// Pause after a failed `getUpdates` before retrying the same offset
const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Timing knobs for the polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingOptions {
    /// Wait between successful batches, bounds the outbound call rate
    pub idle_interval: Duration,
    /// Wait after a transport failure
    pub error_backoff: Duration,
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self {
            idle_interval: DEFAULT_IDLE_INTERVAL,
            error_backoff: DEFAULT_ERROR_BACKOFF,
        }
    }
}

/// Cursor value after consuming `batch` in order
///
/// Each consumed update moves the cursor to `update_id + 1`; an empty batch
/// leaves it unchanged.
#[must_use]
pub fn advance_cursor(cursor: i64, batch: &[Update]) -> i64 {
    batch.iter().fold(cursor, |_, update| update.update_id + 1)
}

/// Run the polling loop until `shutdown` flips to `true`
///
/// Removes any registered webhook first (Telegram refuses `getUpdates` while
/// one is set). Shutdown is checked between batches and interrupts the idle
/// and backoff sleeps; an in-flight request or dispatch always runs to
/// completion. Returns the final cursor.
pub async fn run_polling(
    transport: Arc<dyn Transport>,
    dispatcher: Arc<Dispatcher>,
    options: PollingOptions,
    mut shutdown: watch::Receiver<bool>,
) -> i64 {
    if let Err(e) = transport.deregister_callback().await {
        tracing::warn!(error = %e, "failed to delete Telegram webhook before polling");
    }

    let mut cursor: i64 = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }

        match transport.get_updates(cursor).await {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::debug!(count = updates.len(), cursor, "received Telegram updates");
                }

                for update in &updates {
                    cursor = advance_cursor(cursor, std::slice::from_ref(update));

                    let Some(message) = &update.message else {
                        continue;
                    };

                    tracing::info!(
                        update_id = update.update_id,
                        chat_id = message.chat.id,
                        from = %message.sender_name(),
                        "received message"
                    );

                    if let Err(e) = dispatcher.handle_message(message).await {
                        tracing::error!(error = %e, update_id = update.update_id, "error handling message");
                    }
                }

                if wait_or_shutdown(options.idle_interval, &mut shutdown).await {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, cursor, "Telegram getUpdates error");
                if wait_or_shutdown(options.error_backoff, &mut shutdown).await {
                    break;
                }
            }
        }
    }

    tracing::info!(cursor, "polling stopped");
    cursor
}

/// Sleep for `delay`, returning `true` early if shutdown was requested
async fn wait_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = tokio::time::sleep(delay) => *shutdown.borrow(),
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}
