//! # Synchronous Client API
//!
//! Purpose: Expose one blocking call per server capability over a single
//! connection, returning typed results.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `Client` hides the connection and the codec.
//! 2. **One Command In Flight**: Every call takes `&mut self`; the protocol has
//!    no request ids, so exclusive access is the ordering guarantee.
//! 3. **Fail Fast**: Unexpected response shapes surface immediately as errors.
//! 4. **Mirrored Errors**: Each failing call also overwrites the last-error slot
//!    with the same error it returns.

use tracing::debug;

use mygram_common::{
    decode_response, Command, CountQuery, CountResponse, Document, Error, Result, ReplicationStatus, Response,
    SearchQuery, SearchResponse, ServerInfo,
};
use mygram_text::normalize;

use crate::config::ClientConfig;
use crate::connection::Connection;

/// Blocking client for a single server connection.
///
/// Not `Sync`-safe by contract: share it across threads only behind a lock.
pub struct Client {
    config: ClientConfig,
    connection: Connection,
    last_error: Option<Error>,
}

impl Client {
    /// Creates a disconnected client.
    pub fn new(config: ClientConfig) -> Self {
        let connection = Connection::new(&config);
        Client {
            config,
            connection,
            last_error: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Opens the connection.
    pub fn connect(&mut self) -> Result<()> {
        let result = self.connection.connect();
        self.record(result)
    }

    /// Closes the connection. Safe to call at any time.
    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Runs `SEARCH`.
    ///
    /// With query normalization configured, the query and AND/NOT terms are
    /// normalized first; table, filters, and sort column are sent as given.
    pub fn search(&mut self, query: &SearchQuery) -> Result<SearchResponse> {
        let mut query = query.clone();
        if let Some(options) = self.config.query_normalization() {
            query.conditions.map_terms(|term| normalize(term, options));
        }
        self.call(Command::Search(query), |response| match response {
            Response::Results(results) => Some(results),
            _ => None,
        })
    }

    /// Runs `COUNT`, normalizing terms the same way as [`Client::search`].
    pub fn count(&mut self, query: &CountQuery) -> Result<CountResponse> {
        let mut query = query.clone();
        if let Some(options) = self.config.query_normalization() {
            query.map_terms(|term| normalize(term, options));
        }
        self.call(Command::Count(query), |response| match response {
            Response::Count(count) => Some(count),
            _ => None,
        })
    }

    /// Fetches one document by primary key.
    pub fn get(&mut self, table: &str, primary_key: &str) -> Result<Document> {
        let command = Command::Get {
            table: table.to_string(),
            primary_key: primary_key.to_string(),
        };
        self.call(command, |response| match response {
            Response::Doc(doc) => Some(doc),
            _ => None,
        })
    }

    /// Fetches server statistics.
    pub fn info(&mut self) -> Result<ServerInfo> {
        self.call(Command::Info, |response| match response {
            Response::Info(info) => Some(info),
            _ => None,
        })
    }

    /// Returns the raw `CONFIG` response.
    pub fn get_config(&mut self) -> Result<String> {
        let result = self.raw_ok(&Command::Config);
        self.record(result)
    }

    /// Asks the server to write a snapshot, to `path` or its default location.
    /// Returns the path the server reports.
    pub fn save(&mut self, path: Option<&str>) -> Result<String> {
        self.call(Command::Save(path.map(str::to_string)), |response| match response {
            Response::Saved(path) => Some(path),
            _ => None,
        })
    }

    /// Asks the server to load a snapshot. Returns the path the server reports.
    pub fn load(&mut self, path: &str) -> Result<String> {
        self.call(Command::Load(path.to_string()), |response| match response {
            Response::Loaded(path) => Some(path),
            _ => None,
        })
    }

    pub fn get_replication_status(&mut self) -> Result<ReplicationStatus> {
        self.call(Command::ReplicationStatus, |response| match response {
            Response::Replication(status) => Some(status),
            _ => None,
        })
    }

    pub fn start_replication(&mut self) -> Result<()> {
        self.call(Command::ReplicationStart, acknowledged)
    }

    pub fn stop_replication(&mut self) -> Result<()> {
        self.call(Command::ReplicationStop, acknowledged)
    }

    /// Turns on per-query `DEBUG` blocks for this connection.
    pub fn enable_debug(&mut self) -> Result<()> {
        self.call(Command::DebugOn, acknowledged)
    }

    pub fn disable_debug(&mut self) -> Result<()> {
        self.call(Command::DebugOff, acknowledged)
    }

    /// Sends `line` verbatim and returns the unparsed response.
    ///
    /// An `ERROR` response still fails with `Error::Server`.
    pub fn send_command(&mut self, line: &str) -> Result<String> {
        let result = self.round_trip(&Command::Raw(line.to_string())).and_then(|response| {
            match decode_response(&response) {
                Ok(Response::Error(message)) => Err(Error::Server(message)),
                _ => Ok(response),
            }
        });
        self.record(result)
    }

    /// The error of the most recent failing call, if any call has failed.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Message of [`Client::last_error`], or `""`.
    pub fn last_error_message(&self) -> String {
        self.last_error.as_ref().map(Error::message).unwrap_or_default()
    }

    fn call<T>(&mut self, command: Command, extract: impl FnOnce(Response) -> Option<T>) -> Result<T> {
        let result = self.execute(&command).and_then(|response| {
            extract(response).ok_or_else(Error::unexpected_response)
        });
        self.record(result)
    }

    fn execute(&mut self, command: &Command) -> Result<Response> {
        let line = self.round_trip(command)?;
        decode_response(&line)?.into_result()
    }

    /// Like `execute`, but returns the raw line of any `OK` response.
    fn raw_ok(&mut self, command: &Command) -> Result<String> {
        let line = self.round_trip(command)?;
        decode_response(&line)?.into_result()?;
        Ok(line)
    }

    fn round_trip(&mut self, command: &Command) -> Result<String> {
        let line = command.encode();
        debug!(verb = command.verb(), "sending command");
        self.connection.send_command(&line)
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.last_error = Some(err.clone());
        }
        result
    }
}

fn acknowledged(_: Response) -> Option<()> {
    Some(())
}
