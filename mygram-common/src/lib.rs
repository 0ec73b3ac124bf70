// mygram-common - Shared types, errors, and the text protocol codec
//
// This crate is I/O-free: it turns requests into command lines and
// response lines into typed results.

pub mod error;
pub mod format;
pub mod protocol;
pub mod types;

// Re-export for convenience
pub use error::*;
pub use format::format_bytes;
pub use protocol::*;
pub use types::*;
