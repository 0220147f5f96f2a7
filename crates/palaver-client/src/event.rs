//! Session events and actions.

use palaver_proto::{ChatMessage, MessageKind};

/// Events the caller feeds into the session.
///
/// The caller is responsible for:
/// - Delivering lines the user types at the prompt
/// - Delivering inbound lines from the transport, in arrival order
/// - Signaling transport end-of-stream exactly once
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The transport finished connecting; the session should announce
    /// itself to the server.
    Opened,

    /// One line of user input from the REPL.
    Input(String),

    /// One inbound line from the transport (payload of a single message).
    ServerData(Vec<u8>),

    /// The transport reached end-of-stream (local or remote close).
    TransportClosed,
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Write this message to the transport.
    Send(ChatMessage),

    /// Show an inbound server message to the user.
    Display {
        /// Rendered message text.
        text: String,
        /// Display category (drives coloring; presentation decides how).
        kind: MessageKind,
    },

    /// Show local-only feedback to the user (no network effect).
    Notice(String),

    /// Half-close the transport for writing; no further sends will follow.
    CloseWrite,

    /// Log message for debugging.
    Log {
        /// Log message.
        message: String,
    },

    /// The session is over; the caller should leave connected mode.
    Exit,
}
