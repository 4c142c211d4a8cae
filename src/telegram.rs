//! Minimal Telegram Bot API client (`sendMessage` only).

use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::{Config, Error, Result};

/// Something that can deliver a text message to a chat id.
pub trait MessageSender {
    fn send_message(&self, chat_id: i64, text: &str) -> impl Future<Output = Result<()>>;
}

/// Error envelope returned by the Bot API on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    description: Option<String>,
}

/// Per-message formatting options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOptions {
    pub parse_mode: Option<String>,
    pub disable_preview: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            parse_mode: Some(crate::config::DEFAULT_PARSE_MODE.to_string()),
            disable_preview: false,
        }
    }
}

#[derive(Clone)]
pub struct TelegramBotClient {
    http: Client,
    api_url: String,
    bot_token: String,
    options: SendOptions,
}

impl TelegramBotClient {
    pub fn new(config: &Config) -> Result<Self> {
        let options = SendOptions {
            parse_mode: config.parse_mode.clone(),
            disable_preview: config.disable_preview,
        };
        Self::with_api_url(
            config.telegram_api_url.clone(),
            config.bot_token.clone(),
            options,
            config.request_timeout(),
        )
    }

    /// Create client with custom API url (primarily for tests).
    pub fn with_api_url<S1: Into<String>, S2: Into<String>>(
        api_url: S1,
        bot_token: S2,
        options: SendOptions,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("tg_broadcast/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::TelegramError(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            bot_token: bot_token.into(),
            options,
        })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.bot_token
        )
    }

    fn form_params(&self, chat_id: i64, text: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("chat_id", chat_id.to_string()), ("text", text.to_string())];
        if let Some(ref mode) = self.options.parse_mode {
            params.push(("parse_mode", mode.clone()));
        }
        if self.options.disable_preview {
            params.push(("disable_web_page_preview", "true".to_string()));
        }
        params
    }
}

impl MessageSender for TelegramBotClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.send_message_url())
            .form(&self.form_params(chat_id, text))
            .send()
            .await
            // URL carries the bot token
            .map_err(|e| Error::TelegramError(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ApiErrorResponse>(&text)
            .ok()
            .and_then(|r| r.description)
            .unwrap_or(text);

        Err(Error::TelegramError(format!(
            "HTTP {}: {}",
            status.as_u16(),
            reason
        )))
    }
}
