//! Session state machine.
//!
//! One `Session` exists per connection attempt and lives until the
//! transport reaches end-of-stream. It owns the lifecycle state, the
//! continuation state (the last command verb the user sent), and the
//! mapping from free-text input to outgoing requests.

use palaver_proto::{ChatMessage, MessageKind, command};

use crate::event::{SessionAction, SessionEvent};

/// Lifecycle state of a session.
///
/// There is no `Disconnected` variant: before a connection attempt no
/// `Session` value exists at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport connect initiated; waiting for [`SessionEvent::Opened`].
    Connecting,
    /// Announced to the server; accepting input and inbound data.
    Connected,
    /// Disconnect request sent and write side closed; awaiting
    /// end-of-stream.
    Disconnecting,
    /// Transport ended; the session is inert.
    Terminated,
}

/// Per-connection session state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable without a socket.
///
/// # Invariants
///
/// - `last_command` is `None` until the first recognized command is sent,
///   and thereafter holds the most recently sent verb. It is never set to
///   `disconnect` (disconnect ends the session instead).
/// - Once `Disconnecting`, no further `Send` actions are produced.
#[derive(Debug, Clone)]
pub struct Session {
    /// Name announced to the server; stamped on every outgoing request.
    username: String,
    /// Lifecycle state.
    state: SessionState,
    /// Verb of the most recently sent command, for continuation input.
    last_command: Option<String>,
}

impl Session {
    /// Create a session for a connection attempt by `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), state: SessionState::Connecting, last_command: None }
    }

    /// Name this session announced (or will announce) to the server.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Verb the next continuation line would reuse, if any.
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::Opened => self.handle_opened(),
            SessionEvent::Input(line) => self.handle_input(&line),
            SessionEvent::ServerData(buffer) => self.handle_server_data(&buffer),
            SessionEvent::TransportClosed => self.handle_transport_closed(),
        }
    }

    /// Transport established: announce presence and start accepting input.
    ///
    /// "Connected" is optimistic - no server acknowledgment is awaited.
    fn handle_opened(&mut self) -> Vec<SessionAction> {
        if self.state != SessionState::Connecting {
            return vec![];
        }

        self.state = SessionState::Connected;
        vec![SessionAction::Send(ChatMessage::new(&self.username, command::CONNECT))]
    }

    /// Map one line of user input to an outgoing request.
    ///
    /// Precedence: `disconnect`, then a whisper target or recognized bare
    /// verb, then continuation of the previous command. An unrecognized
    /// leading token with no previous command is local feedback only.
    fn handle_input(&mut self, line: &str) -> Vec<SessionAction> {
        if self.state != SessionState::Connected {
            return vec![];
        }

        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            // Blank line: nothing to send, and not a continuation either.
            return vec![];
        };
        let contents = tokens.collect::<Vec<_>>().join(" ");

        if first == command::DISCONNECT {
            // last_command is left as-is; the session ends regardless.
            self.state = SessionState::Disconnecting;
            return vec![
                SessionAction::Send(ChatMessage::new(&self.username, command::DISCONNECT)),
                SessionAction::CloseWrite,
            ];
        }

        if command::is_send_verb(first) {
            self.last_command = Some(first.to_string());
            return vec![SessionAction::Send(ChatMessage::with_contents(
                &self.username,
                first,
                contents,
            ))];
        }

        // The leading token was data, not a command: resend the previous
        // verb with the ENTIRE raw line as contents.
        match &self.last_command {
            Some(verb) => vec![SessionAction::Send(ChatMessage::with_contents(
                &self.username,
                verb.clone(),
                line,
            ))],
            None => vec![SessionAction::Notice(format!("Command <{first}> was not recognized"))],
        }
    }

    /// Decode and classify one inbound line.
    ///
    /// A decode failure is fatal to this single event only: it is logged
    /// and dropped, and the session continues.
    fn handle_server_data(&mut self, buffer: &[u8]) -> Vec<SessionAction> {
        if self.state == SessionState::Terminated {
            return vec![];
        }

        match ChatMessage::from_line(buffer) {
            Ok(message) => {
                let text = message.render();
                let kind = MessageKind::classify(&text);
                vec![SessionAction::Display { text, kind }]
            },
            Err(e) => vec![SessionAction::Log { message: format!("dropping inbound line: {e}") }],
        }
    }

    /// End-of-stream: the session is over, return control to the shell.
    fn handle_transport_closed(&mut self) -> Vec<SessionAction> {
        if self.state == SessionState::Terminated {
            return vec![];
        }

        self.state = SessionState::Terminated;
        vec![SessionAction::Exit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_session() -> Session {
        let mut session = Session::new("alice");
        let actions = session.handle(SessionEvent::Opened);
        assert_eq!(
            actions,
            vec![SessionAction::Send(ChatMessage::new("alice", command::CONNECT))]
        );
        session
    }

    /// Extract the single sent message from an action list.
    fn sent(actions: &[SessionAction]) -> &ChatMessage {
        match actions {
            [SessionAction::Send(msg)] => msg,
            other => panic!("expected a single Send action, got {other:?}"),
        }
    }

    #[test]
    fn opened_announces_connect() {
        let session = connected_session();
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.last_command(), None);
    }

    #[test]
    fn recognized_command_sends_and_sets_continuation() {
        let mut session = connected_session();

        let actions = session.handle(SessionEvent::Input("echo hello".into()));
        assert_eq!(sent(&actions), &ChatMessage::with_contents("alice", "echo", "hello"));
        assert_eq!(session.last_command(), Some("echo"));
    }

    #[test]
    fn continuation_resends_previous_verb_with_full_line() {
        let mut session = connected_session();
        session.handle(SessionEvent::Input("echo hello".into()));

        let actions = session.handle(SessionEvent::Input("world".into()));
        assert_eq!(sent(&actions), &ChatMessage::with_contents("alice", "echo", "world"));

        // Multi-word continuation keeps the whole raw line, leading token
        // included - it was data, not a command.
        let actions = session.handle(SessionEvent::Input("hello again world".into()));
        assert_eq!(
            sent(&actions),
            &ChatMessage::with_contents("alice", "echo", "hello again world")
        );
        assert_eq!(session.last_command(), Some("echo"));
    }

    #[test]
    fn no_continuation_without_prior_command() {
        let mut session = connected_session();

        let actions = session.handle(SessionEvent::Input("hello".into()));
        assert_eq!(
            actions,
            vec![SessionAction::Notice("Command <hello> was not recognized".into())]
        );
        assert_eq!(session.last_command(), None);
    }

    #[test]
    fn whisper_target_is_the_command() {
        let mut session = connected_session();

        let actions = session.handle(SessionEvent::Input("@bob secret".into()));
        assert_eq!(sent(&actions), &ChatMessage::with_contents("alice", "@bob", "secret"));
        assert_eq!(session.last_command(), Some("@bob"));

        // A bare follow-up whispers to the same target.
        let actions = session.handle(SessionEvent::Input("another secret".into()));
        assert_eq!(
            sent(&actions),
            &ChatMessage::with_contents("alice", "@bob", "another secret")
        );
    }

    #[test]
    fn new_command_replaces_continuation() {
        let mut session = connected_session();
        session.handle(SessionEvent::Input("echo one".into()));
        session.handle(SessionEvent::Input("broadcast two".into()));
        assert_eq!(session.last_command(), Some("broadcast"));

        let actions = session.handle(SessionEvent::Input("three".into()));
        assert_eq!(sent(&actions), &ChatMessage::with_contents("alice", "broadcast", "three"));
    }

    #[test]
    fn users_sends_with_empty_contents() {
        let mut session = connected_session();

        let actions = session.handle(SessionEvent::Input("users".into()));
        assert_eq!(sent(&actions), &ChatMessage::new("alice", "users"));
        assert_eq!(session.last_command(), Some("users"));
    }

    #[test]
    fn dashes_are_not_stripped() {
        let mut session = connected_session();

        // `--echo` is not a command; with no prior verb it is rejected
        // locally rather than de-dashed into `echo`.
        let actions = session.handle(SessionEvent::Input("--echo hi".into()));
        assert_eq!(
            actions,
            vec![SessionAction::Notice("Command <--echo> was not recognized".into())]
        );
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = connected_session();
        session.handle(SessionEvent::Input("echo hi".into()));

        assert_eq!(session.handle(SessionEvent::Input(String::new())), vec![]);
        assert_eq!(session.handle(SessionEvent::Input("   ".into())), vec![]);
    }

    #[test]
    fn disconnect_sends_once_and_half_closes() {
        let mut session = connected_session();
        session.handle(SessionEvent::Input("echo hi".into()));

        let actions = session.handle(SessionEvent::Input("disconnect".into()));
        assert_eq!(
            actions,
            vec![
                SessionAction::Send(ChatMessage::new("alice", command::DISCONNECT)),
                SessionAction::CloseWrite,
            ]
        );
        assert_eq!(session.state(), SessionState::Disconnecting);

        // last_command is untouched, and no further input produces sends.
        assert_eq!(session.last_command(), Some("echo"));
        assert_eq!(session.handle(SessionEvent::Input("echo again".into())), vec![]);

        // End-of-stream terminates the session and exits connected mode.
        let actions = session.handle(SessionEvent::TransportClosed);
        assert_eq!(actions, vec![SessionAction::Exit]);
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[test]
    fn inbound_data_displays_with_classification() {
        let mut session = connected_session();

        let wire = ChatMessage::with_contents("bob", "connect", "bob has connected")
            .to_line()
            .unwrap();
        let actions = session.handle(SessionEvent::ServerData(wire.into_bytes()));
        assert_eq!(
            actions,
            vec![SessionAction::Display {
                text: "bob has connected".into(),
                kind: MessageKind::Joined,
            }]
        );
    }

    #[test]
    fn malformed_inbound_data_is_logged_and_dropped() {
        let mut session = connected_session();

        let actions = session.handle(SessionEvent::ServerData(b"{not json".to_vec()));
        assert!(matches!(actions.as_slice(), [SessionAction::Log { .. }]));

        // The session is still usable.
        assert_eq!(session.state(), SessionState::Connected);
        let actions = session.handle(SessionEvent::Input("echo still here".into()));
        assert_eq!(sent(&actions), &ChatMessage::with_contents("alice", "echo", "still here"));
    }

    #[test]
    fn inbound_data_still_displays_while_disconnecting() {
        let mut session = connected_session();
        session.handle(SessionEvent::Input("disconnect".into()));

        let wire = ChatMessage::with_contents("bob", "broadcast", "(all) bob: bye")
            .to_line()
            .unwrap();
        let actions = session.handle(SessionEvent::ServerData(wire.into_bytes()));
        assert!(matches!(actions.as_slice(), [SessionAction::Display { .. }]));
    }

    mod properties {
        use palaver_proto::command;
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// After a recognized command, any line whose leading token is
            /// not itself recognized must resend that command with the
            /// full raw line as contents.
            #[test]
            fn continuation_reuses_last_verb_with_raw_line(
                line in "[a-z]{1,10}( [a-z]{1,10}){0,5}",
            ) {
                let first = line.split_whitespace().next().unwrap_or_default();
                prop_assume!(!command::is_send_verb(first));
                prop_assume!(first != command::DISCONNECT);

                let mut session = Session::new("alice");
                session.handle(SessionEvent::Opened);
                session.handle(SessionEvent::Input("broadcast warmup".into()));

                let actions = session.handle(SessionEvent::Input(line.clone()));
                prop_assert_eq!(
                    actions,
                    vec![SessionAction::Send(ChatMessage::with_contents(
                        "alice",
                        "broadcast",
                        line,
                    ))]
                );
            }

            /// Without a prior command, the same input must stay local:
            /// feedback only, zero sends.
            #[test]
            fn no_send_without_prior_command(
                line in "[a-z]{1,10}( [a-z]{1,10}){0,5}",
            ) {
                let first = line.split_whitespace().next().unwrap_or_default();
                prop_assume!(!command::is_send_verb(first));
                prop_assume!(first != command::DISCONNECT);

                let mut session = Session::new("alice");
                session.handle(SessionEvent::Opened);

                let actions = session.handle(SessionEvent::Input(line));
                prop_assert!(
                    matches!(actions.as_slice(), [SessionAction::Notice(_)]),
                    "expected local feedback only, got {:?}",
                    actions
                );
            }
        }
    }

    #[test]
    fn terminated_session_is_inert() {
        let mut session = connected_session();
        session.handle(SessionEvent::TransportClosed);

        assert_eq!(session.handle(SessionEvent::Input("echo hi".into())), vec![]);
        assert_eq!(session.handle(SessionEvent::ServerData(b"{}".to_vec())), vec![]);
        assert_eq!(session.handle(SessionEvent::TransportClosed), vec![]);
        assert_eq!(session.handle(SessionEvent::Opened), vec![]);
    }
}
