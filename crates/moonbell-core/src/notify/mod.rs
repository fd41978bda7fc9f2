//! Telegram notification delivery.

pub mod format;

use reqwest::Client;
use serde_json::json;

use crate::error::{CoreError, Result};
use crate::storage::TelegramConfig;

/// Message sink. The tick loop only depends on the success/failure signal
/// to decide whether a reminder gets marked sent.
pub trait Notifier {
    fn send(&self, text: &str) -> Result<()>;
}

/// Telegram Bot API notifier (sendMessage, HTML parse mode).
pub struct TelegramNotifier {
    api_base: String,
    bot_token: String,
    chat_id: i64,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        Self::with_api_base(config, "https://api.telegram.org")
    }

    /// Override the API host (mock servers in tests).
    pub fn with_api_base(config: &TelegramConfig, api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::notify(e.to_string()))?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id,
            client,
        })
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, text: &str) -> Result<()> {
        if self.bot_token.is_empty() {
            return Err(CoreError::notify("Telegram bot token not configured"));
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let body = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        let response = tokio::runtime::Handle::current()
            .block_on(self.client.post(&url).json(&body).send())
            .map_err(|e| CoreError::notify(e.to_string()))?;

        let status = response.status();
        let payload: serde_json::Value = tokio::runtime::Handle::current()
            .block_on(response.json())
            .unwrap_or_default();

        if !status.is_success() || payload.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let description = payload
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(CoreError::notify(format!(
                "sendMessage failed (HTTP {status}): {description}"
            )));
        }
        Ok(())
    }
}
