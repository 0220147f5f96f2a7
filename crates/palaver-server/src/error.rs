//! Server error types.

use std::io;

use thiserror::Error;

/// Errors that can occur while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address we tried to bind.
        addr: String,
        /// Underlying socket error.
        source: io::Error,
    },

    /// Other socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
