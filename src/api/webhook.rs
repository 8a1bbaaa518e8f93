//! Telegram webhook endpoint

use std::sync::Arc;

use axum::{Router, body::Bytes, extract::State, http::StatusCode, routing::post};

use super::ApiState;
use crate::channels::Update;

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/webhook", post(handle_update))
        .with_state(state)
}

/// Handle one pushed update
///
/// The body is decoded by hand so a malformed payload is answered with 400
/// rather than axum's JSON rejection codes. The message is dispatched before
/// responding; dispatch errors are logged and still acknowledged with 200 so
/// Telegram does not redeliver.
async fn handle_update(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "malformed webhook body");
            return (StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    tracing::debug!(update_id = update.update_id, "received Telegram update");

    if let Some(message) = &update.message {
        tracing::info!(
            update_id = update.update_id,
            chat_id = message.chat.id,
            from = %message.sender_name(),
            "received message"
        );

        if let Err(e) = state.dispatcher.handle_message(message).await {
            tracing::error!(error = %e, update_id = update.update_id, "error handling message");
        }
    }

    (StatusCode::OK, "OK")
}
