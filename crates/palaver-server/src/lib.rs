//! Palaver chat server.
//!
//! A line-based TCP server for the Palaver protocol: every connection is a
//! chat user, every line is one JSON envelope. One tokio task is spawned
//! per connection; a shared [`Roster`] routes messages between them.
//!
//! # Components
//!
//! - [`Server`]: accept loop and runtime configuration
//! - [`Roster`]: username → mailbox routing table
//! - connection handling lives in the private `session` module

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod reply;
mod roster;
mod session;

use std::net::SocketAddr;

use tokio::net::TcpListener;

pub use crate::{error::ServerError, roster::Roster};

/// Runtime configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to, e.g. `0.0.0.0:8080` or `127.0.0.1:0`.
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:8080".to_string() }
    }
}

/// The chat server: a bound listener plus the shared roster.
pub struct Server {
    listener: TcpListener,
    roster: Roster,
}

impl Server {
    /// Bind the listener.
    ///
    /// # Errors
    ///
    /// `ServerError::Bind` if the address cannot be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address)
            .await
            .map_err(|source| ServerError::Bind { addr: config.bind_address.clone(), source })?;

        Ok(Self { listener, roster: Roster::new() })
    }

    /// Address the server is listening on (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the accept loop. One task per connection; a failed accept is
    /// logged and the loop continues.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!("accepted connection from {peer}");
                    let roster = self.roster.clone();
                    tokio::spawn(session::handle_connection(stream, roster));
                },
                Err(e) => {
                    tracing::warn!("accept failed: {e}");
                },
            }
        }
    }
}
