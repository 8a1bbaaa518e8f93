//! Telegram Bot API request/response types

use serde::{Deserialize, Serialize};

/// Telegram Bot API base URL
pub const API_BASE: &str = "https://api.telegram.org/bot";

/// A Telegram user or bot
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default)]
    pub can_join_groups: bool,
    #[serde(default)]
    pub can_read_all_group_messages: bool,
    #[serde(default)]
    pub supports_inline_queries: bool,
}

/// A Telegram chat
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub chat_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// A Telegram message (only the fields the bot reads)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Message {
    /// Message text, empty when the message carries none
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Sender display name for logging
    #[must_use]
    pub fn sender_name(&self) -> &str {
        self.from.as_ref().map_or("Unknown", |u| u.first_name.as_str())
    }
}

/// An incoming update, from either `getUpdates` or a webhook push
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// Current webhook registration as reported by `getWebhookInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WebhookInfo {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub has_custom_certificate: bool,
    #[serde(default)]
    pub pending_update_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_message: Option<String>,
}

/// Telegram sendMessage request
#[derive(Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

/// Telegram getUpdates request
#[derive(Serialize)]
pub(crate) struct GetUpdatesRequest {
    pub offset: i64,
    pub allowed_updates: Vec<&'static str>,
}

/// Telegram setWebhook request
#[derive(Serialize)]
pub(crate) struct SetWebhookRequest<'a> {
    pub url: &'a str,
}

/// Telegram API response wrapper
#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

impl<T> TelegramResponse<T> {
    /// Unwrap the result, turning `ok: false` into a platform-reported error
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` when the platform flagged the call as failed or
    /// returned no result
    pub fn into_result(self, method: &'static str) -> crate::Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(crate::Error::Api {
                method,
                description: self
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_without_message_parses() {
        let update: Update = serde_json::from_str(r#"{"update_id": 7}"#).unwrap();
        assert_eq!(update.update_id, 7);
        assert!(update.message.is_none());
    }

    #[test]
    fn update_ignores_unknown_fields() {
        let raw = r#"{
            "update_id": 10,
            "message": {
                "message_id": 3,
                "from": {"id": 1, "is_bot": false, "first_name": "Ada"},
                "chat": {"id": 99, "type": "private"},
                "date": 1700000000,
                "text": "/help",
                "entities": [{"type": "bot_command", "offset": 0, "length": 5}]
            },
            "edited_message": null
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 99);
        assert_eq!(message.chat.chat_type, "private");
        assert_eq!(message.text(), "/help");
        assert_eq!(message.sender_name(), "Ada");
    }

    #[test]
    fn response_not_ok_becomes_api_error() {
        let raw = r#"{"ok": false, "error_code": 400, "description": "Bad Request: bad webhook"}"#;
        let parsed: TelegramResponse<bool> = serde_json::from_str(raw).unwrap();
        let err = parsed.into_result("setWebhook").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Api { method: "setWebhook", ref description } if description == "Bad Request: bad webhook"
        ));
    }

    #[test]
    fn response_ok_yields_result() {
        let raw = r#"{"ok": true, "result": {"id": 5, "is_bot": true, "first_name": "Clip", "username": "clip_bot"}}"#;
        let parsed: TelegramResponse<User> = serde_json::from_str(raw).unwrap();
        let user = parsed.into_result("getMe").unwrap();
        assert!(user.is_bot);
        assert_eq!(user.username.as_deref(), Some("clip_bot"));
    }
}
