//! # MygramDB Sync Client
//!
//! Purpose: Provide a blocking client for the MygramDB n-gram search server
//! over its line-oriented text protocol.
//!
//! ## Design Principles
//! 1. **One Socket, One Command**: A client owns one connection and never
//!    pipelines; every call is a full request/response round trip.
//! 2. **Typed Results**: Responses are decoded into plain structs built from
//!    strings, integers, booleans, and string sequences.
//! 3. **Explicit Failure**: Every call returns `Result`; the last error is also
//!    kept on the client for bindings that poll for it.
//! 4. **No Hidden Retries**: Reconnect and retry policy belong to the caller.
//!
//! ## Example
//!
//! ```no_run
//! use mygram_client::{Client, ClientConfig, SearchQuery};
//!
//! let mut client = Client::new(ClientConfig::new("127.0.0.1", 11016));
//! client.connect()?;
//! let page = client.search(&SearchQuery::new("articles", "rust").limit(10))?;
//! println!("{} hits: {:?}", page.total_count, page.results);
//! client.disconnect();
//! # Ok::<(), mygram_client::Error>(())
//! ```

mod client;
mod config;
mod connection;

pub use client::Client;
pub use config::{
    ClientConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RECV_BUFFER_SIZE, DEFAULT_TIMEOUT_MS,
};
pub use connection::Connection;

pub use mygram_common::{
    escape_query_string, Command, CountQuery, CountResponse, DebugInfo, Document, Error, ErrorKind, Result,
    ReplicationStatus, SearchQuery, SearchResponse, ServerInfo,
};
pub use mygram_text as text;
