//! The chat envelope and its line codec.
//!
//! A `ChatMessage` is the single JSON object exchanged in both directions:
//!
//! ```text
//! {"username": "alice", "command": "echo", "contents": "hello"}\n
//! ```
//!
//! Requests carry the user's raw contents; server replies reuse the same
//! envelope with `contents` replaced by a fully formatted display line
//! (e.g. `"8/30/2026 2:15 PM <alice> (echo): hello"`).

use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// Command vocabulary shared by client and server.
///
/// A whisper command is not listed here: it is any token starting with `@`,
/// and the whole token (e.g. `@bob`) is the command.
pub mod command {
    /// Announce presence; sent automatically after the transport connects.
    pub const CONNECT: &str = "connect";
    /// Leave the session; the server broadcasts the departure.
    pub const DISCONNECT: &str = "disconnect";
    /// Ask the server to repeat the contents back to the sender only.
    pub const ECHO: &str = "echo";
    /// Send the contents to every connected user.
    pub const BROADCAST: &str = "broadcast";
    /// Request the roster of currently connected users.
    pub const USERS: &str = "users";

    /// Whether `token` names a whisper target (`@bob`).
    pub fn is_whisper(token: &str) -> bool {
        token.starts_with('@')
    }

    /// Whether `token` is a command the user may type while connected.
    ///
    /// Covers the bare send verbs and whisper targets. `connect` is not
    /// included: it is only ever sent by the session itself, and
    /// `disconnect` is handled separately because it ends the session.
    pub fn is_send_verb(token: &str) -> bool {
        is_whisper(token) || matches!(token, ECHO | BROADCAST | USERS)
    }
}

/// The JSON envelope for one chat message.
///
/// # Invariants
///
/// - `username` and `command` are non-empty; [`ChatMessage::to_line`]
///   enforces this before serializing.
/// - `contents` may be empty and is omitted from the wire when it is
///   (`{"username":..,"command":"users"}` is a complete request).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Name of the user this message is from (or, for server replies, the
    /// user whose request produced it).
    pub username: String,

    /// Command verb: one of the [`command`] constants or an `@target`
    /// whisper token.
    pub command: String,

    /// Free-text body. Empty for bodiless commands like `users`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contents: String,
}

impl ChatMessage {
    /// Create a message with empty contents.
    pub fn new(username: impl Into<String>, command: impl Into<String>) -> Self {
        Self { username: username.into(), command: command.into(), contents: String::new() }
    }

    /// Create a message with contents.
    pub fn with_contents(
        username: impl Into<String>,
        command: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        Self { username: username.into(), command: command.into(), contents: contents.into() }
    }

    /// Encode into wire format: the JSON serialization followed by a single
    /// `\n` terminator.
    ///
    /// Lossless round-trip with [`ChatMessage::from_line`]: JSON escapes any
    /// newlines inside the fields, so the terminator is unambiguous.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::EmptyField` if `username` or `command` is empty
    /// - `ProtocolError::Malformed` if serialization fails (not reachable
    ///   for string fields in practice)
    pub fn to_line(&self) -> Result<String> {
        if self.username.is_empty() {
            return Err(ProtocolError::EmptyField("username"));
        }
        if self.command.is_empty() {
            return Err(ProtocolError::EmptyField("command"));
        }

        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Decode one wire line.
    ///
    /// Accepts the payload with or without its line terminator; leading and
    /// trailing whitespace is ignored.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Encoding` if the buffer is not UTF-8
    /// - `ProtocolError::Malformed` if the payload is not a JSON object of
    ///   the envelope shape (`username` and `command` are required;
    ///   `contents` defaults to empty)
    pub fn from_line(buffer: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(buffer)?;
        Ok(serde_json::from_str(text.trim())?)
    }

    /// Human-readable display form.
    ///
    /// Server replies embed the complete formatted line (timestamp, sender,
    /// category tag) in `contents`, so that is shown verbatim. Messages
    /// with no contents fall back to naming the sender and verb.
    pub fn render(&self) -> String {
        if self.contents.is_empty() {
            format!("<{}> {}", self.username, self.command)
        } else {
            self.contents.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_terminates_with_newline() {
        let line = ChatMessage::with_contents("alice", "echo", "hello").to_line().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn encode_matches_wire_shape() {
        let line = ChatMessage::with_contents("alice", "echo", "hello").to_line().unwrap();
        assert_eq!(line, "{\"username\":\"alice\",\"command\":\"echo\",\"contents\":\"hello\"}\n");
    }

    #[test]
    fn empty_contents_omitted_from_wire() {
        let line = ChatMessage::new("alice", "users").to_line().unwrap();
        assert_eq!(line, "{\"username\":\"alice\",\"command\":\"users\"}\n");
    }

    #[test]
    fn missing_contents_decodes_to_empty() {
        let msg = ChatMessage::from_line(b"{\"username\":\"alice\",\"command\":\"users\"}").unwrap();
        assert_eq!(msg.contents, "");
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let result = ChatMessage::from_line(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        let result = ChatMessage::from_line(b"{\"user\":\"alice\"}");
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn decode_rejects_non_utf8() {
        let result = ChatMessage::from_line(&[0xff, 0xfe, b'{', b'}']);
        assert!(matches!(result, Err(ProtocolError::Encoding(_))));
    }

    #[test]
    fn encode_requires_username_and_command() {
        let missing_user = ChatMessage::new("", "echo");
        assert!(matches!(missing_user.to_line(), Err(ProtocolError::EmptyField("username"))));

        let missing_command = ChatMessage::new("alice", "");
        assert!(matches!(missing_command.to_line(), Err(ProtocolError::EmptyField("command"))));
    }

    #[test]
    fn render_prefers_contents() {
        let msg = ChatMessage::with_contents("alice", "echo", "(echo) alice: hello");
        assert_eq!(msg.render(), "(echo) alice: hello");
    }

    #[test]
    fn render_falls_back_to_verb() {
        let msg = ChatMessage::new("alice", "users");
        assert_eq!(msg.render(), "<alice> users");
    }

    #[test]
    fn whisper_tokens_are_send_verbs() {
        assert!(command::is_send_verb("@bob"));
        assert!(command::is_send_verb("echo"));
        assert!(command::is_send_verb("broadcast"));
        assert!(command::is_send_verb("users"));
        assert!(!command::is_send_verb("connect"));
        assert!(!command::is_send_verb("disconnect"));
        assert!(!command::is_send_verb("hello"));
    }
}
