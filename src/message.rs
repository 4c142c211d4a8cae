//! Broadcast message loading

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Read the message text sent to every recipient.
///
/// The content is passed through untouched; an empty message is rejected
/// because the Bot API refuses empty text.
pub fn load_message<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    if content.trim().is_empty() {
        return Err(Error::InvalidArgument(format!(
            "Message file {} is empty",
            path.display()
        )));
    }

    Ok(content)
}
