//! # Response Types
//!
//! Typed results decoded from server responses. Everything here is built
//! from strings, integers, booleans, string sequences, and ordered
//! string pairs so a host binding can marshal it without custom glue.
//!
//! ## Design Principles
//!
//! 1. **Absent Is Not Zero**: Debug counters are `Option`s; a server that did
//!    not report a value is distinguishable from one that reported `0`.
//! 2. **Order Preserving**: Result ids, document fields, and table names keep
//!    the order the server sent them in.
//! 3. **Plain Data**: No behavior beyond small lookups and formatting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::format_bytes;

/// Per-query execution details reported after a `DEBUG` marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub query_time_ms: Option<f64>,
    pub index_time_ms: Option<f64>,
    pub filter_time_ms: Option<f64>,
    /// Number of query terms.
    pub terms: Option<u32>,
    /// Number of n-grams the terms expanded into.
    pub ngrams: Option<u32>,
    pub candidates: Option<u64>,
    pub after_intersection: Option<u64>,
    pub after_not: Option<u64>,
    pub after_filters: Option<u64>,
    /// Reported under the `final` key.
    pub final_count: Option<u64>,
    /// Name of the optimization strategy the server chose.
    pub optimization: Option<String>,
}

/// Result of `SEARCH`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total matches on the server, independent of `LIMIT`.
    pub total_count: u64,
    /// Primary keys of the returned page, in server order.
    pub results: Vec<String>,
    pub debug: Option<DebugInfo>,
}

/// Result of `COUNT`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
    pub debug: Option<DebugInfo>,
}

/// A document returned by `GET`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub primary_key: String,
    /// Fields in first-seen order.
    pub fields: Vec<(String, String)>,
}

impl Document {
    /// Creates an empty document.
    pub fn new(primary_key: impl Into<String>) -> Self {
        Document {
            primary_key: primary_key.into(),
            fields: Vec::new(),
        }
    }

    /// Inserts a field. A repeated key overwrites the earlier value but keeps
    /// its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Returns a field value by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Server statistics returned by `INFO`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub version: String,
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub active_connections: u64,
    pub index_size_bytes: u64,
    pub doc_count: u64,
    pub tables: Vec<String>,
}

impl fmt::Display for ServerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version={} uptime={}s requests={} connections={} index={} docs={} tables=[{}]",
            self.version,
            self.uptime_seconds,
            self.total_requests,
            self.active_connections,
            format_bytes(self.index_size_bytes),
            self.doc_count,
            self.tables.join(",")
        )
    }
}

/// Replication state returned by `REPLICATION STATUS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationStatus {
    /// True only when the server reported `status=running`.
    pub running: bool,
    /// Current GTID, verbatim. Empty when not reported.
    pub gtid: String,
    /// The full response line as received.
    pub status_str: String,
}
