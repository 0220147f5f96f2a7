//! TCP line transport for the client.
//!
//! Provides [`Connection`] which handles socket I/O for newline-delimited
//! messages. This is a thin layer that just writes and reads lines -
//! protocol logic remains in the Sans-IO [`crate::Session`].
//!
//! Outbound messages are encoded and written in the order they are queued.
//! Dropping (or closing) the outbound sender half-closes the socket for
//! writing, which is how a disconnect is completed; the read side keeps
//! delivering lines until the server closes, at which point a single
//! [`TransportEvent::Closed`] is emitted.

use palaver_proto::ChatMessage;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established. Fatal to the connect attempt.
    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    /// The socket failed mid-session.
    #[error("stream error: {0}")]
    Stream(#[source] std::io::Error),
}

/// Events delivered by the read side of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One inbound line (terminator stripped).
    Line(String),

    /// End-of-stream. Emitted exactly once, after the last line.
    Closed,
}

/// Handle to a connected TCP transport.
///
/// Messages are sent/received via the channels; internal tasks handle the
/// socket I/O.
pub struct Connection {
    /// Send messages to the server. Drop or [`Connection::close_write`] to
    /// half-close the socket.
    pub to_server: Option<mpsc::Sender<ChatMessage>>,
    /// Receive events from the server.
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the reader task.
    reader_handle: tokio::task::AbortHandle,
}

impl Connection {
    /// Half-close the socket for writing.
    ///
    /// The writer task drains any queued messages first; the read side is
    /// unaffected and will deliver the server's remaining lines followed by
    /// [`TransportEvent::Closed`].
    pub fn close_write(&mut self) {
        self.to_server = None;
    }

    /// Stop the connection without waiting for end-of-stream.
    pub fn stop(&mut self) {
        self.to_server = None;
        self.reader_handle.abort();
    }
}

/// Connect to a Palaver server over TCP.
///
/// Returns a [`Connection`] with channels for message transport.
///
/// # Errors
///
/// `TransportError::Connect` if the TCP connection cannot be established.
pub async fn connect(host: &str, port: u16) -> Result<Connection, TransportError> {
    let stream =
        TcpStream::connect((host, port)).await.map_err(TransportError::Connect)?;
    let (read_half, write_half) = stream.into_split();

    let (to_server_tx, to_server_rx) = mpsc::channel::<ChatMessage>(32);
    let (from_server_tx, from_server_rx) = mpsc::channel::<TransportEvent>(32);

    tokio::spawn(run_writer(write_half, to_server_rx));
    let reader = tokio::spawn(run_reader(read_half, from_server_tx));

    Ok(Connection {
        to_server: Some(to_server_tx),
        from_server: from_server_rx,
        reader_handle: reader.abort_handle(),
    })
}

/// Write queued messages until the channel closes, then half-close.
async fn run_writer(mut write_half: OwnedWriteHalf, mut to_server: mpsc::Receiver<ChatMessage>) {
    while let Some(message) = to_server.recv().await {
        let line = match message.to_line() {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("dropping unencodable message: {e}");
                continue;
            },
        };

        if let Err(e) = write_half.write_all(line.as_bytes()).await {
            tracing::warn!("write failed, closing write side: {e}");
            break;
        }
    }

    // Channel closed (disconnect) or write failed: half-close so the
    // server sees our end-of-stream.
    if let Err(e) = write_half.shutdown().await {
        tracing::debug!("socket shutdown failed: {e}");
    }
}

/// Forward inbound lines in order, then signal end-of-stream once.
async fn run_reader(read_half: OwnedReadHalf, from_server: mpsc::Sender<TransportEvent>) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if from_server.send(TransportEvent::Line(line)).await.is_err() {
                    // Receiver gone; nobody is listening anymore.
                    return;
                }
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("read failed, treating as end-of-stream: {e}");
                break;
            },
        }
    }

    let _ = from_server.send(TransportEvent::Closed).await;
}
