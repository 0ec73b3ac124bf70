//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use mygram_text::NormalizeOptions;

/// Default server host. Only IPv4 literals are accepted.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_PORT: u16 = 11016;

/// Default timeout for connect, send, and receive.
pub const DEFAULT_TIMEOUT_MS: u32 = 5000;

/// Default receive buffer (64 KB). A response must be strictly smaller than
/// the buffer; one that fills it is rejected.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for [`Client`](crate::Client).
///
/// Built with the `with_*` setters, then moved into the client, which only
/// ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    host: String,
    port: u16,
    timeout_ms: u32,
    recv_buffer_size: usize,
    query_normalization: Option<NormalizeOptions>,
}

impl ClientConfig {
    /// Creates a configuration for `host:port` with default timeout and buffer.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ClientConfig {
            host: host.into(),
            port,
            ..ClientConfig::default()
        }
    }

    /// Sets the timeout in milliseconds. `0` disables timeouts.
    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the receive buffer size. Must exceed the largest expected response.
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size.max(1);
        self
    }

    /// Normalizes query terms before `SEARCH`/`COUNT` are encoded.
    pub fn with_query_normalization(mut self, options: NormalizeOptions) -> Self {
        self.query_normalization = Some(options);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Socket timeout, or `None` when timeouts are disabled.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(u64::from(ms))),
        }
    }

    pub fn recv_buffer_size(&self) -> usize {
        self.recv_buffer_size
    }

    pub fn query_normalization(&self) -> Option<&NormalizeOptions> {
        self.query_normalization.as_ref()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            query_normalization: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.host(), DEFAULT_HOST);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.timeout(), Some(Duration::from_millis(5000)));
        assert_eq!(config.recv_buffer_size(), DEFAULT_RECV_BUFFER_SIZE);
        assert!(config.query_normalization().is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("10.0.0.5", 9000)
            .with_timeout_ms(250)
            .with_recv_buffer_size(0)
            .with_query_normalization(NormalizeOptions::default().with_lower(true));

        assert_eq!(config.host(), "10.0.0.5");
        assert_eq!(config.port(), 9000);
        assert_eq!(config.timeout_ms(), 250);
        assert_eq!(config.recv_buffer_size(), 1);
        assert!(config.query_normalization().is_some_and(|options| options.lower));
    }

    #[test]
    fn test_zero_timeout_disables_timeouts() {
        let config = ClientConfig::default().with_timeout_ms(0);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_config_serializes_for_bindings() {
        let config = ClientConfig::new("127.0.0.1", 11016);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["host"], "127.0.0.1");
        assert_eq!(json["port"], 11016);
        assert_eq!(json["timeout_ms"], 5000);
        assert_eq!(json["recv_buffer_size"], 65536);
    }
}
