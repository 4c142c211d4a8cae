//! Admin directory API client (user roster).

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::info;

use crate::{Config, Error, Result};

/// One entry of the roster.
///
/// Only `username` is interpreted; everything else the API sends is kept as-is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new<S: Into<String>>(username: S) -> Self {
        Self {
            username: username.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    users: Vec<User>,
}

#[derive(Debug, Clone)]
pub struct UserDirectoryClient {
    http: Client,
    base_url: String,
    admin_token: String,
}

impl UserDirectoryClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(
            config.api_base_url.clone(),
            config.admin_token.clone(),
            config.request_timeout(),
        )
    }

    /// Create client with explicit endpoint and credential (primarily for tests).
    pub fn with_base_url<S1: Into<String>, S2: Into<String>>(
        base_url: S1,
        admin_token: S2,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("tg_broadcast/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::DirectoryError(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            admin_token: admin_token.into(),
        })
    }

    fn users_url(&self) -> String {
        format!("{}/api/user", self.base_url.trim_end_matches('/'))
    }

    /// Fetch the complete roster in one request.
    ///
    /// Any non-success status, or a body without a `users` array, is an error:
    /// the run cannot continue without a roster.
    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        let url = self.users_url();

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.admin_token)
            .send()
            .await
            .map_err(|e| Error::DirectoryError(format!("Failed to reach directory: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::DirectoryError(format!("Failed to read directory response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::DirectoryError(format!(
                "Failed to fetch users: HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let body: UsersResponse = serde_json::from_str(&text).map_err(|e| {
            Error::DirectoryError(format!("Unexpected directory response: {} ({})", e, text))
        })?;

        info!(count = body.users.len(), url = %url, "Fetched user roster");
        Ok(body.users)
    }
}
