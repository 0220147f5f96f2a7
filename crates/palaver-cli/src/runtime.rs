//! Connected-mode event loop.
//!
//! Bridges the Sans-IO [`Session`] to the terminal and the transport: a
//! `tokio::select!` loop multiplexes stdin lines and inbound server events,
//! feeds them to the session one at a time, and executes the actions it
//! returns. Each event is processed to completion before the next is
//! dispatched, so the session needs no locking.

use palaver_client::{
    Session, SessionAction, SessionEvent,
    transport::{self, Connection, TransportError, TransportEvent},
};
use thiserror::Error;
use tokio::io::{BufReader, Lines, Stdin};

use crate::{render, shell};

/// Connected-mode prompt.
const PROMPT: &str = "connected> ";

/// Errors that abort entry into connected mode.
///
/// Once the session is up, all failures are handled in place (logged or
/// shown to the user); only a failed connect propagates to the shell.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Transport could not connect.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Run one chat session to completion.
///
/// Returns once the transport reaches end-of-stream (after a local
/// `disconnect` or a server-side close). Stdin is borrowed from the shell
/// so buffered input is not lost across the mode switch.
pub async fn run_session(
    username: &str,
    host: &str,
    port: u16,
    stdin: &mut Lines<BufReader<Stdin>>,
) -> Result<(), RuntimeError> {
    let mut conn = transport::connect(host, port).await?;
    let mut session = Session::new(username);

    // Announce presence. "Connected" is optimistic; no ack is awaited.
    let actions = session.handle(SessionEvent::Opened);
    if execute(actions, &mut conn).await {
        return Ok(());
    }
    render::notice(&format!("connected to {host}:{port} as {username}"));

    let mut stdin_open = true;
    loop {
        shell::prompt(PROMPT);

        let event = tokio::select! {
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => SessionEvent::Input(line),
                Ok(None) => {
                    // Stdin ended mid-session: leave cleanly.
                    stdin_open = false;
                    SessionEvent::Input("disconnect".to_string())
                },
                Err(e) => {
                    tracing::warn!("stdin read failed: {e}");
                    stdin_open = false;
                    SessionEvent::Input("disconnect".to_string())
                },
            },

            inbound = conn.from_server.recv() => match inbound {
                Some(TransportEvent::Line(line)) => SessionEvent::ServerData(line.into_bytes()),
                Some(TransportEvent::Closed) | None => SessionEvent::TransportClosed,
            },
        };

        let actions = session.handle(event);
        if execute(actions, &mut conn).await {
            return Ok(());
        }
    }
}

/// Execute session actions. Returns `true` when the session is over.
async fn execute(actions: Vec<SessionAction>, conn: &mut Connection) -> bool {
    for action in actions {
        match action {
            SessionAction::Send(message) => {
                if let Some(to_server) = &conn.to_server {
                    if to_server.send(message).await.is_err() {
                        tracing::warn!("transport gone, dropping outbound message");
                    }
                }
            },
            SessionAction::Display { text, kind } => render::server_message(&text, kind),
            SessionAction::Notice(text) => render::notice(&text),
            SessionAction::CloseWrite => conn.close_write(),
            SessionAction::Log { message } => tracing::debug!("{message}"),
            SessionAction::Exit => return true,
        }
    }
    false
}
