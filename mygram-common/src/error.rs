//! # Error Taxonomy
//!
//! Purpose: One error type shared by the codec, the text pipeline, and the
//! blocking client, so every fallible call returns the same `Result`.
//!
//! ## Design Principles
//! 1. **Message Is The Contract**: `Display` prints exactly the message the
//!    client mirrors into its last-error slot, nothing more.
//! 2. **Stable Kinds**: `ErrorKind` is a flat, `Copy` projection that binding
//!    layers can map onto host exception classes.
//! 3. **No Fatal Paths**: Nothing here panics; all failures are values.

use std::io;

use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client, the codec, and the text pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Transport failure, or a lifecycle violation such as "not connected".
    #[error("{0}")]
    Connection(String),

    /// A connect, send, or receive exceeded the configured timeout.
    #[error("{0}")]
    Timeout(String),

    /// The response did not have the shape the command expects.
    #[error("{0}")]
    Protocol(String),

    /// A single receive filled the whole buffer, so the frame may be cut off.
    #[error("response exceeds receive buffer of {limit} bytes")]
    FrameTooLarge {
        /// Receive buffer size in bytes.
        limit: usize,
    },

    /// The server answered `ERROR <message>`; holds the literal message.
    #[error("{0}")]
    Server(String),

    /// Invalid UTF-8 bytes or an invalid Unicode scalar value.
    #[error("{0}")]
    Encoding(String),
}

/// Coarse error category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Timeout,
    Protocol,
    Server,
    Encoding,
}

impl Error {
    /// Shorthand for the catch-all unexpected-shape error.
    pub fn unexpected_response() -> Self {
        Error::Protocol("unexpected response format".to_string())
    }

    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection(_) => ErrorKind::Connection,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Protocol(_) | Error::FrameTooLarge { .. } => ErrorKind::Protocol,
            Error::Server(_) => ErrorKind::Server,
            Error::Encoding(_) => ErrorKind::Encoding,
        }
    }

    /// Returns the user-visible message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Wraps an I/O failure with context, keeping timeouts distinguishable.
    ///
    /// `WouldBlock` is what a blocking socket reports on Unix when
    /// `SO_RCVTIMEO`/`SO_SNDTIMEO` expires.
    pub fn from_io(context: &str, err: &io::Error) -> Self {
        let message = format!("{context}: {err}");
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout(message),
            _ => Error::Connection(message),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from_io("io error", &err)
    }
}
