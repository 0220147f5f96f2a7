//! Error types for the Palaver wire protocol.
//!
//! Codec failures are always scoped to the single line that produced them.
//! A malformed inbound line is dropped and logged by the caller; it never
//! tears down the session.

use thiserror::Error;

/// Errors produced by the line codec.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload was not valid JSON or did not match the envelope shape.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload was not valid UTF-8.
    #[error("message is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// A required envelope field was present but empty.
    #[error("envelope field `{0}` must not be empty")]
    EmptyField(&'static str),
}

/// Convenience alias for codec results.
pub type Result<T> = std::result::Result<T, ProtocolError>;
