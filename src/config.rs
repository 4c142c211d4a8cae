//! Runtime configuration for a broadcast run
//!
//! Credentials and endpoints come from the environment (optionally via `.env`).
//! CLI flags override the optional values after loading.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

pub const BOT_TOKEN_VAR: &str = "TG_BOT_TOKEN";
pub const ADMIN_TOKEN_VAR: &str = "ADMIN_TOKEN";
pub const API_BASE_URL_VAR: &str = "API_BASE_URL";
pub const TELEGRAM_API_URL_VAR: &str = "TELEGRAM_API_URL";
pub const MESSAGE_FILE_VAR: &str = "MESSAGE_FILE";
pub const TIMEOUT_VAR: &str = "REQUEST_TIMEOUT_SECS";

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_MESSAGE_FILE: &str = "message";
pub const DEFAULT_PARSE_MODE: &str = "HTML";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything a run needs, built once at process entry.
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub admin_token: String,
    pub api_base_url: String,
    pub telegram_api_url: String,
    pub message_file: PathBuf,
    /// `None` sends plain text.
    pub parse_mode: Option<String>,
    pub disable_preview: bool,
    pub timeout_secs: u64,
    pub dry_run: bool,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Required values that are missing or blank fail with [`Error::MissingConfig`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::MissingConfig(format!("{} not set", key)))
        };

        let bot_token = required(BOT_TOKEN_VAR)?;
        let admin_token = required(ADMIN_TOKEN_VAR)?;
        let api_base_url = required(API_BASE_URL_VAR)?;

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "{} must be a positive number of seconds: {}",
                        TIMEOUT_VAR, raw
                    ))
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            bot_token,
            admin_token,
            api_base_url,
            telegram_api_url: lookup(TELEGRAM_API_URL_VAR)
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            message_file: lookup(MESSAGE_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MESSAGE_FILE)),
            parse_mode: Some(DEFAULT_PARSE_MODE.to_string()),
            disable_preview: false,
            timeout_secs,
            dry_run: false,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Tokens never end up in logs via {:?}
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("admin_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("message_file", &self.message_file)
            .field("parse_mode", &self.parse_mode)
            .field("disable_preview", &self.disable_preview)
            .field("timeout_secs", &self.timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}
