//! Telegram chat id extraction from directory usernames.

use tracing::debug;

/// Marker that precedes the chat id inside a username.
pub const TGID_MARKER: &str = "tgid-";

/// Extract the Telegram chat id linked to a username.
///
/// Only the text after the last `tgid-` counts, with surrounding whitespace
/// ignored. Returns `None` when the marker is absent or the suffix is not a
/// base-10 `i64`. Users without a linked account are common, so this is not
/// an error.
pub fn extract_identifier(username: &str) -> Option<i64> {
    let (_, suffix) = username.rsplit_once(TGID_MARKER)?;

    match suffix.trim().parse::<i64>() {
        Ok(id) => Some(id),
        Err(e) => {
            debug!(username, suffix, error = %e, "Malformed tgid suffix, treating as no identifier");
            None
        }
    }
}
