//! One-shot broadcast run: message → roster → dispatch.

use tracing::info;

use crate::directory::UserDirectoryClient;
use crate::dispatch::{BroadcastDispatcher, BroadcastReport};
use crate::message::load_message;
use crate::telegram::TelegramBotClient;
use crate::{Config, Result};

/// Run the whole pipeline once.
///
/// Message and directory faults abort the run before anything is sent.
/// Delivery faults are contained in the returned report.
pub async fn run(config: &Config) -> Result<BroadcastReport> {
    let message = load_message(&config.message_file)?;
    info!(
        path = %config.message_file.display(),
        chars = message.chars().count(),
        "Loaded broadcast message"
    );

    let directory = UserDirectoryClient::new(config)?;
    let bot = TelegramBotClient::new(config)?;

    let users = directory.fetch_users().await?;

    let report = BroadcastDispatcher::new(&bot)
        .dry_run(config.dry_run)
        .dispatch(&users, &message)
        .await;

    Ok(report)
}
