//! Raw Telegram Bot API calls

use std::path::Path;

use reqwest::RequestBuilder;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use super::types::{
    GetUpdatesRequest, Message, SendMessageRequest, SetWebhookRequest, TelegramResponse, Update,
    User, WebhookInfo,
};
use crate::{Error, Result};

impl super::TelegramClient {
    /// Send a prepared request and decode the `{ok, result, description}` envelope
    ///
    /// Telegram answers API-level failures with a JSON body even on 4xx, so the
    /// body is decoded before the status is considered. Anything that does not
    /// decode is a transport failure. Request URLs carry the token, so they
    /// are stripped from reqwest errors.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| {
                Error::Channel(format!("Telegram {method} error: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                Error::Channel(format!(
                    "Telegram {method} response read error: {}",
                    e.without_url()
                ))
            })?;

        let parsed: TelegramResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Channel(format!("Telegram {method} error: {status} - {e}: {body}"))
        })?;

        parsed.into_result(method)
    }

    /// Validate the bot token by calling `getMe`
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the token is rejected
    pub async fn get_me(&self) -> Result<User> {
        let request = self.client.get(self.method_url("getMe"));
        self.call("getMe", request).await
    }

    /// Fetch pending updates starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let request = self
            .client
            .post(self.method_url("getUpdates"))
            .json(&GetUpdatesRequest {
                offset,
                allowed_updates: vec!["message"],
            });
        self.call("getUpdates", request).await
    }

    /// Send a plain-text message to a chat
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text });

        let _sent: Message = self.call("sendMessage", request).await?;
        tracing::debug!(chat_id, "Telegram message sent");
        Ok(())
    }

    /// Upload a local file as a document
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the upload fails
    pub async fn send_document(&self, chat_id: i64, path: &Path) -> Result<()> {
        let data = tokio::fs::read(path).await?;
        let size = data.len();
        let file_name = path
            .file_name()
            .map_or_else(|| "video.mp4".to_string(), |n| n.to_string_lossy().into_owned());

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", Part::bytes(data).file_name(file_name));

        let request = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form);

        let _sent: Message = self.call("sendDocument", request).await?;
        tracing::debug!(chat_id, bytes = size, "Telegram document sent");
        Ok(())
    }

    /// Set webhook URL for receiving updates
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or Telegram rejects the URL
    pub async fn set_webhook(&self, url: &str) -> Result<()> {
        let request = self
            .client
            .post(self.method_url("setWebhook"))
            .json(&SetWebhookRequest { url });

        let _accepted: bool = self.call("setWebhook", request).await?;
        tracing::info!(url, "Telegram webhook set");
        Ok(())
    }

    /// Delete webhook (switch to polling mode)
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn delete_webhook(&self) -> Result<()> {
        let request = self.client.post(self.method_url("deleteWebhook"));

        let _deleted: bool = self.call("deleteWebhook", request).await?;
        tracing::info!("Telegram webhook deleted");
        Ok(())
    }

    /// Get the current webhook registration
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn get_webhook_info(&self) -> Result<WebhookInfo> {
        let request = self.client.get(self.method_url("getWebhookInfo"));
        self.call("getWebhookInfo", request).await
    }
}
