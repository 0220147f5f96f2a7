//! Client
//!
//! Action-based session state machine for the Palaver chat protocol. Owns
//! the connection lifecycle, the command-continuation shortcut, and the
//! classification of inbound server text.
//!
//! # Architecture
//!
//! The session is Sans-IO: it receives events ([`SessionEvent`]), processes
//! them through pure state machine logic, and returns actions
//! ([`SessionAction`]) for the caller to execute. The caller owns the
//! terminal and the socket; the session never blocks and never performs I/O.
//!
//! # Components
//!
//! - [`Session`]: per-connection state machine
//! - [`SessionEvent`]: events fed into the session
//! - [`SessionAction`]: actions produced by the session
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::Connection`]: channel handle to a connected TCP socket
//! - [`transport::connect`]: connect to a server

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod event;
mod session;

#[cfg(feature = "transport")]
pub mod transport;

pub use event::{SessionAction, SessionEvent};
pub use palaver_proto::{ChatMessage, MessageKind};
pub use session::{Session, SessionState};
