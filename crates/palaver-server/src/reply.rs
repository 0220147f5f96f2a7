//! Reply formatting.
//!
//! The server answers with the same JSON envelope it received, `contents`
//! replaced by a fully formatted display line. The client classifies these
//! lines by their embedded tag (`"(echo)"`, `"has connected"`, ...), so the
//! tag spellings here are wire format, not cosmetics.

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

/// Timestamp layout stamped on every reply, e.g. `8/30/2026 2:15 PM`.
const TIMESTAMP: &[FormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year] [hour padding:none repr:12]:[minute] [period]"
);

/// Current timestamp in reply format (UTC).
pub fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(TIMESTAMP)
        .unwrap_or_else(|_| "unknown time".to_string())
}

/// Broadcast line for a user joining.
pub fn joined(ts: &str, username: &str) -> String {
    format!("{ts} <{username}> has connected")
}

/// Broadcast line for a user leaving.
pub fn left(ts: &str, username: &str) -> String {
    format!("{ts} <{username}> has disconnected")
}

/// Direct echo reply.
pub fn echo(ts: &str, username: &str, contents: &str) -> String {
    format!("{ts} <{username}> (echo): {contents}")
}

/// Broadcast line for a message to all users.
pub fn broadcast(ts: &str, username: &str, contents: &str) -> String {
    format!("{ts} <{username}> (all): {contents}")
}

/// Whisper line delivered to the target user only.
pub fn whisper(ts: &str, username: &str, contents: &str) -> String {
    format!("{ts} <{username}> (whisper): {contents}")
}

/// Roster listing. `names` must already be in display order.
pub fn roster(ts: &str, names: &[String]) -> String {
    let mut line = format!("{ts}: currently connected users:");
    for name in names {
        line.push_str("\n<");
        line.push_str(name);
        line.push('>');
    }
    line
}

/// Rejection for a duplicate username on connect.
pub fn username_taken(username: &str) -> String {
    format!("Username <{username}> is taken. Please try another username.")
}

/// Rejection for a whisper to a user who is not connected.
pub fn no_such_user(target: &str) -> String {
    format!("No such user: {target}")
}
