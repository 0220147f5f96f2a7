//! Property tests for the line codec.
//!
//! The wire format must round-trip any envelope whose required fields are
//! non-empty, including whitespace, quotes, and unicode in the bodies.
//! Newlines inside fields are fine for the codec itself: JSON escapes them,
//! so the terminator appended by `to_line` stays unambiguous.

use palaver_proto::ChatMessage;
use proptest::prelude::*;

/// Non-empty field strategy covering unicode and JSON-hostile characters.
fn field() -> impl Strategy<Value = String> {
    ".{1,40}"
}

proptest! {
    #[test]
    fn envelope_round_trip(
        username in field(),
        command in field(),
        contents in ".{0,200}",
    ) {
        let msg = ChatMessage::with_contents(username, command, contents);
        let line = msg.to_line().unwrap();

        let parsed = ChatMessage::from_line(line.as_bytes()).unwrap();
        prop_assert_eq!(msg, parsed);
    }

    #[test]
    fn encoded_line_has_single_terminator(
        username in field(),
        command in field(),
        contents in ".{0,200}",
    ) {
        let line = ChatMessage::with_contents(username, command, contents)
            .to_line()
            .unwrap();

        prop_assert!(line.ends_with('\n'));
        prop_assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn rendered_server_reply_contains_username(
        username in "[a-z]{1,12}",
        body in "[ -~]{0,80}",
    ) {
        // Server replies embed the sender in the formatted contents; the
        // rendered form must surface it.
        let contents = format!("<{username}> (echo): {body}");
        let msg = ChatMessage::with_contents(username.clone(), "echo", contents);

        let parsed = ChatMessage::from_line(msg.to_line().unwrap().as_bytes()).unwrap();
        prop_assert!(parsed.render().contains(&username));
    }
}
