//! Palaver wire protocol.
//!
//! Palaver speaks newline-delimited JSON over a TCP stream: every message,
//! in either direction, is one JSON object on one line. This crate owns the
//! envelope type ([`ChatMessage`]), the line codec, and the classification
//! of inbound server text into display categories ([`MessageKind`]).
//!
//! # Components
//!
//! - [`ChatMessage`]: the `{username, command, contents}` envelope
//! - [`MessageKind`]: display category decoded from a server message
//! - [`ProtocolError`]: codec failures (always scoped to a single line)

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod kind;
mod message;

pub use errors::ProtocolError;
pub use kind::MessageKind;
pub use message::{ChatMessage, command};
