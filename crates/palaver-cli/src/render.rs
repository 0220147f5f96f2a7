//! Message rendering: category → color mapping.
//!
//! Presentation only; which category a message belongs to is decided at the
//! protocol boundary by `MessageKind::classify`.

use crossterm::style::{Color, Stylize};
use palaver_proto::MessageKind;

/// Color for a display category. `None` renders unstyled.
pub fn color(kind: MessageKind) -> Option<Color> {
    match kind {
        MessageKind::Echo => Some(Color::Blue),
        MessageKind::Broadcast => Some(Color::Yellow),
        MessageKind::Whisper => Some(Color::Magenta),
        MessageKind::Joined => Some(Color::Green),
        MessageKind::Left => Some(Color::Red),
        MessageKind::Roster => Some(Color::Cyan),
        MessageKind::Other => None,
    }
}

/// Print one inbound server message.
pub fn server_message(text: &str, kind: MessageKind) {
    match color(kind) {
        Some(color) => println!("{}", text.with(color)),
        None => println!("{text}"),
    }
}

/// Print local-only feedback.
pub fn notice(text: &str) {
    println!("{}", text.dark_grey());
}

/// Print an error to stderr.
pub fn error(text: &str) {
    eprintln!("{}", text.with(Color::Red));
}
