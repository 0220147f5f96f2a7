//! Per-connection handling.
//!
//! Each connection runs one read loop task plus one writer task. The read
//! loop parses envelopes and routes them; the writer drains the
//! connection's mailbox to the socket. All cross-connection delivery goes
//! through mailboxes, so no task ever writes to another task's socket.

use palaver_proto::{ChatMessage, command};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpStream, tcp::OwnedWriteHalf},
    sync::mpsc,
};

use crate::{reply, roster::Roster};

/// Mailbox capacity per connection. A slow reader that falls this far
/// behind starts losing messages rather than stalling the whole room.
const MAILBOX_CAPACITY: usize = 64;

/// Drive one client connection to completion.
pub async fn handle_connection(stream: TcpStream, roster: Roster) {
    let (read_half, write_half) = stream.into_split();
    let (mailbox_tx, mailbox_rx) = mpsc::channel::<String>(MAILBOX_CAPACITY);

    tokio::spawn(run_writer(write_half, mailbox_rx));

    // Username this connection registered, once `connect` succeeds.
    let mut registered: Option<String> = None;

    let mut lines = BufReader::new(read_half).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("read failed, closing connection: {e}");
                break;
            },
        };

        let message = match ChatMessage::from_line(line.as_bytes()) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("dropping malformed line: {e}");
                continue;
            },
        };

        if message.username.is_empty() {
            tracing::warn!("dropping message with empty username");
            continue;
        }

        let keep_open = dispatch(&message, &roster, &mailbox_tx, &mut registered);
        if !keep_open {
            break;
        }
    }

    // Remote drop or disconnect: free the name and tell the others.
    if let Some(username) = registered.take() {
        roster.remove(&username);
        let leave = ChatMessage::with_contents(
            &username,
            command::DISCONNECT,
            reply::left(&reply::timestamp(), &username),
        );
        deliver_to_all(&roster, &leave);
    }
}

/// Route one message. Returns `false` when the connection should close.
fn dispatch(
    message: &ChatMessage,
    roster: &Roster,
    mailbox: &mpsc::Sender<String>,
    registered: &mut Option<String>,
) -> bool {
    let username = message.username.as_str();
    let ts = reply::timestamp();

    if command::is_whisper(&message.command) {
        let target = message.command.strip_prefix('@').unwrap_or(&message.command);
        tracing::info!("user <{username}> whispers to <{target}>");

        let whisper = with_reply(message, reply::whisper(&ts, username, &message.contents));
        match roster.mailbox(target) {
            Some(target_mailbox) => deliver(&target_mailbox, &whisper),
            None => {
                let rejection = with_reply(message, reply::no_such_user(target));
                deliver(mailbox, &rejection);
            },
        }
        return true;
    }

    match message.command.as_str() {
        command::CONNECT => {
            tracing::info!("user <{username}> connected");

            if registered.is_some() {
                tracing::warn!("user <{username}> sent connect twice, ignoring");
                return true;
            }

            if roster.register(username, mailbox.clone()) {
                *registered = Some(username.to_string());
                let announcement = with_reply(message, reply::joined(&ts, username));
                deliver_to_all(roster, &announcement);
            } else {
                let rejection = with_reply(message, reply::username_taken(username));
                deliver(mailbox, &rejection);
                return false;
            }
        },

        command::DISCONNECT => {
            tracing::info!("user <{username}> disconnected");

            if registered.take().is_some() {
                roster.remove(username);
                let announcement = with_reply(message, reply::left(&ts, username));
                deliver_to_all(roster, &announcement);
            }
            return false;
        },

        command::ECHO => {
            tracing::info!("user <{username}> echoed message <{}>", message.contents);
            let echo = with_reply(message, reply::echo(&ts, username, &message.contents));
            deliver(mailbox, &echo);
        },

        command::BROADCAST => {
            tracing::info!("user <{username}> broadcast message <{}>", message.contents);
            let broadcast =
                with_reply(message, reply::broadcast(&ts, username, &message.contents));
            deliver_to_all(roster, &broadcast);
        },

        command::USERS => {
            tracing::info!("user <{username}> requested active users");
            let listing = with_reply(message, reply::roster(&ts, &roster.names()));
            deliver(mailbox, &listing);
        },

        other => {
            tracing::warn!("user <{username}> sent unknown command <{other}>, ignoring");
        },
    }

    true
}

/// Envelope helper: same sender and verb, formatted reply contents.
fn with_reply(message: &ChatMessage, contents: String) -> ChatMessage {
    ChatMessage::with_contents(&message.username, &message.command, contents)
}

/// Queue a message on one mailbox. A full or closed mailbox drops the
/// message; the owning connection is slow or already going away.
fn deliver(mailbox: &mpsc::Sender<String>, message: &ChatMessage) {
    let line = match message.to_line() {
        Ok(line) => line,
        Err(e) => {
            tracing::error!("failed to encode reply: {e}");
            return;
        },
    };

    if mailbox.try_send(line).is_err() {
        tracing::debug!("mailbox unavailable, dropping message");
    }
}

/// Queue a message on every connected user's mailbox, sender included.
fn deliver_to_all(roster: &Roster, message: &ChatMessage) {
    for mailbox in roster.mailboxes() {
        deliver(&mailbox, message);
    }
}

/// Drain the mailbox to the socket until the mailbox closes or the socket
/// fails.
async fn run_writer(mut write_half: OwnedWriteHalf, mut mailbox: mpsc::Receiver<String>) {
    while let Some(line) = mailbox.recv().await {
        if let Err(e) = write_half.write_all(line.as_bytes()).await {
            tracing::debug!("write failed, dropping connection: {e}");
            break;
        }
    }

    if let Err(e) = write_half.shutdown().await {
        tracing::debug!("socket shutdown failed: {e}");
    }
}
