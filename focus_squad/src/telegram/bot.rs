use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::config::{TELEGRAM_API_BASE, TELEGRAM_BOT_TOKEN};
use super::errors::TelegramError;

/// A text message with an optional single URL button
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    /// Button label and URL
    pub button: Option<(String, String)>,
}

impl OutgoingMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            button: None,
        }
    }

    pub fn with_button(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.button = Some((label.into(), url.into()));
        self
    }

    fn to_request_body(&self) -> serde_json::Value {
        let mut body = json!({
            "chat_id": self.chat_id,
            "text": self.text,
        });
        if let Some((label, url)) = &self.button {
            body["reply_markup"] = json!({
                "inline_keyboard": [[{ "text": label, "url": url }]]
            });
        }
        body
    }
}

#[async_trait]
pub trait BotApi: Send + Sync {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), TelegramError>;
}

/// Bot API client over HTTPS
pub struct TelegramBotClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramBotClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl BotApi for TelegramBotClient {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), TelegramError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);

        let response = self
            .client
            .post(&url)
            .json(&message.to_request_body())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::Api(format!("sendMessage failed with {status}: {body}")));
        }

        tracing::debug!(chat_id = message.chat_id, "Telegram message sent");
        Ok(())
    }
}

/// Stand-in used when no bot token is configured
pub struct LogOnlyBot;

#[async_trait]
impl BotApi for LogOnlyBot {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), TelegramError> {
        tracing::info!(
            chat_id = message.chat_id,
            "TELEGRAM_BOT_TOKEN not set, skipping reply"
        );
        Ok(())
    }
}

/// The bot configured through `TELEGRAM_BOT_TOKEN` and `TELEGRAM_API_BASE`.
pub fn default_bot() -> Arc<dyn BotApi> {
    let Some(token) = TELEGRAM_BOT_TOKEN.as_deref() else {
        return Arc::new(LogOnlyBot);
    };

    match TelegramBotClient::new(TELEGRAM_API_BASE.as_str(), token) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build Telegram client");
            Arc::new(LogOnlyBot)
        }
    }
}
