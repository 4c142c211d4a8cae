//! Telegram broadcast library
//!
//! Fetches the user roster from an admin directory API, derives a Telegram
//! chat id from each `...tgid-<id>` username and sends one fixed message to
//! every linked user via the Bot API.

pub mod broadcast;
pub mod config;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod identifier;
pub mod message;
pub mod telegram;

// Re-export common types
pub use config::Config;
pub use directory::{User, UserDirectoryClient};
pub use dispatch::{BroadcastDispatcher, BroadcastReport, Delivery, DeliveryOutcome};
pub use error::{Error, Result};
pub use identifier::extract_identifier;
pub use message::load_message;
pub use telegram::{MessageSender, SendOptions, TelegramBotClient};
