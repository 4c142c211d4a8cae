//! Error types for the broadcast pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Directory API error: {0}")]
    DirectoryError(String),

    #[error("Telegram API error: {0}")]
    TelegramError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
