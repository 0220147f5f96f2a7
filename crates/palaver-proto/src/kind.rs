//! Display classification of inbound server text.
//!
//! The server does not send a structured event type; it embeds a fixed tag
//! substring in the formatted contents (`"(echo)"`, `"has connected"`, ...).
//! We decode that convention into an explicit enum at the boundary so the
//! rest of the client never does string matching.

/// Display category of an inbound server message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Echo of the user's own message (`"(echo)"`).
    Echo,
    /// Message broadcast to all users (`"(all)"`).
    Broadcast,
    /// Direct whisper to this user (`"(whisper)"`).
    Whisper,
    /// A user joined (`"has connected"`).
    Joined,
    /// A user left (`"has disconnected"`).
    Left,
    /// Roster listing (`"currently connected users:"`).
    Roster,
    /// Anything else (server notices, error replies).
    Other,
}

/// Tag table in priority order. First match wins; by server convention the
/// tags are mutually exclusive, the order only matters for contrived input.
const TAGS: &[(&str, MessageKind)] = &[
    ("(echo)", MessageKind::Echo),
    ("(all)", MessageKind::Broadcast),
    ("(whisper)", MessageKind::Whisper),
    ("has connected", MessageKind::Joined),
    ("has disconnected", MessageKind::Left),
    ("currently connected users:", MessageKind::Roster),
];

impl MessageKind {
    /// Classify a rendered server message by its embedded tag.
    pub fn classify(text: &str) -> Self {
        TAGS.iter()
            .find(|(tag, _)| text.contains(tag))
            .map_or(MessageKind::Other, |&(_, kind)| kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_tag() {
        assert_eq!(MessageKind::classify("(echo) alice: hello"), MessageKind::Echo);
        assert_eq!(MessageKind::classify("(all) alice: hi room"), MessageKind::Broadcast);
        assert_eq!(MessageKind::classify("(whisper) alice: psst"), MessageKind::Whisper);
        assert_eq!(MessageKind::classify("alice has connected"), MessageKind::Joined);
        assert_eq!(MessageKind::classify("alice has disconnected"), MessageKind::Left);
        assert_eq!(
            MessageKind::classify("currently connected users:\n<alice>"),
            MessageKind::Roster
        );
    }

    #[test]
    fn unknown_text_is_other() {
        assert_eq!(MessageKind::classify("No such user: bob"), MessageKind::Other);
        assert_eq!(MessageKind::classify(""), MessageKind::Other);
    }

    #[test]
    fn first_match_wins() {
        // Contrived: a message carrying two tags classifies by priority.
        assert_eq!(MessageKind::classify("(echo) bob has connected"), MessageKind::Echo);
        assert_eq!(MessageKind::classify("bob has connected (whisper)"), MessageKind::Whisper);
    }
}
