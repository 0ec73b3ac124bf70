//! # Text Protocol Codec
//!
//! Purpose: Build request lines and decode response lines for the
//! line-oriented search protocol. Pure string transforms; no I/O.
//!
//! ## Design Principles
//!
//! 1. **Bit-Exact Requests**: Command lines are part of the wire contract,
//!    including the asymmetric `SORT` policy and the `LIMIT offset,count` form.
//! 2. **Verb-Keyed Decoding**: A response is `ERROR <message>` or
//!    `OK <verb> ...`; the verb token selects exactly one `Response` variant.
//! 3. **Map First, Project Second**: `key=value` micro-formats are split into
//!    ordered pairs, then known keys are projected into typed fields.
//! 4. **Fail Fast**: Malformed numbers are protocol errors, never zeros.
//!
//! ## Wire Format
//!
//! ```text
//! SEARCH <table> <query> [AND <t>]* [NOT <t>]* [FILTER <k> = <v>]* [SORT ...] [LIMIT ...]\r\n
//! OK RESULTS <total> [<id>]* [DEBUG k=v ...]\r\n
//!
//! COUNT <table> <query> [AND <t>]* [NOT <t>]* [FILTER <k> = <v>]*\r\n
//! OK COUNT <n> [DEBUG k=v ...]\r\n
//!
//! GET <table> <pk>\r\n
//! OK DOC <pk> [k=v]*\r\n
//!
//! INFO\r\n
//! OK INFO\r\n<key>: <value>\r\n...
//! ```

use std::borrow::Cow;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{CountResponse, DebugInfo, Document, ReplicationStatus, SearchResponse, ServerInfo};

/// Line terminator appended to every request.
pub const LINE_TERMINATOR: &str = "\r\n";

const DEBUG_MARKER: &str = "DEBUG";

/// Quotes a term when it contains whitespace or quote characters.
///
/// Bare terms are returned borrowed. Quoted terms get `"` and `\`
/// backslash-escaped; a backslash in a bare term is left alone.
pub fn escape_query_string(term: &str) -> Cow<'_, str> {
    let needs_quotes = term
        .chars()
        .any(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '"' | '\''));
    if !needs_quotes {
        return Cow::Borrowed(term);
    }

    let mut quoted = String::with_capacity(term.len() + 2);
    quoted.push('"');
    for c in term.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Parameters of a `COUNT` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountQuery {
    pub table: String,
    pub query: String,
    pub and_terms: Vec<String>,
    pub not_terms: Vec<String>,
    /// `(column, value)` equality filters, in request order.
    pub filters: Vec<(String, String)>,
}

impl CountQuery {
    pub fn new(table: impl Into<String>, query: impl Into<String>) -> Self {
        CountQuery {
            table: table.into(),
            query: query.into(),
            ..CountQuery::default()
        }
    }

    pub fn and(mut self, term: impl Into<String>) -> Self {
        self.and_terms.push(term.into());
        self
    }

    pub fn not(mut self, term: impl Into<String>) -> Self {
        self.not_terms.push(term.into());
        self
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    /// Applies `rewrite` to the query string and every AND/NOT term.
    pub fn map_terms(&mut self, mut rewrite: impl FnMut(&str) -> String) {
        self.query = rewrite(&self.query);
        for term in self.and_terms.iter_mut().chain(self.not_terms.iter_mut()) {
            *term = rewrite(term);
        }
    }

    fn encode_conditions(&self, out: &mut String) {
        out.push(' ');
        out.push_str(&self.table);
        out.push(' ');
        out.push_str(&escape_query_string(&self.query));
        for term in &self.and_terms {
            out.push_str(" AND ");
            out.push_str(&escape_query_string(term));
        }
        for term in &self.not_terms {
            out.push_str(" NOT ");
            out.push_str(&escape_query_string(term));
        }
        for (column, value) in &self.filters {
            out.push_str(" FILTER ");
            out.push_str(column);
            out.push_str(" = ");
            out.push_str(&escape_query_string(value));
        }
    }
}

/// Parameters of a `SEARCH` request.
///
/// Defaults match the server: primary-key descending, no limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub conditions: CountQuery,
    /// Sort column; `None` sorts by primary key.
    pub sort_column: Option<String>,
    pub sort_desc: bool,
    /// Page size; `0` means no `LIMIT` clause at all.
    pub limit: u32,
    /// Rows to skip; only encodable together with a non-zero `limit`.
    pub offset: u32,
}

impl SearchQuery {
    pub fn new(table: impl Into<String>, query: impl Into<String>) -> Self {
        SearchQuery {
            conditions: CountQuery::new(table, query),
            sort_column: None,
            sort_desc: true,
            limit: 0,
            offset: 0,
        }
    }

    pub fn and(mut self, term: impl Into<String>) -> Self {
        self.conditions = self.conditions.and(term);
        self
    }

    pub fn not(mut self, term: impl Into<String>) -> Self {
        self.conditions = self.conditions.not(term);
        self
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions = self.conditions.filter(column, value);
        self
    }

    /// Sorts by `column`. An empty column means the primary key.
    pub fn sort_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        let column = column.into();
        self.sort_column = if column.is_empty() { None } else { Some(column) };
        self.sort_desc = descending;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    fn encode_sort(&self, out: &mut String) {
        match self.sort_column.as_deref() {
            Some(column) if !column.is_empty() => {
                out.push_str(" SORT ");
                out.push_str(column);
                out.push_str(if self.sort_desc { " DESC" } else { " ASC" });
            }
            // Primary-key descending is the server default and stays implicit.
            _ if !self.sort_desc => out.push_str(" SORT ASC"),
            _ => {}
        }
    }

    fn encode_limit(&self, out: &mut String) {
        if self.limit == 0 {
            return;
        }
        if self.offset > 0 {
            let _ = write!(out, " LIMIT {},{}", self.offset, self.limit);
        } else {
            let _ = write!(out, " LIMIT {}", self.limit);
        }
    }
}

/// A request the client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Search(SearchQuery),
    Count(CountQuery),
    Get { table: String, primary_key: String },
    Info,
    Config,
    /// `SAVE` with an optional server-side path.
    Save(Option<String>),
    Load(String),
    ReplicationStatus,
    ReplicationStart,
    ReplicationStop,
    DebugOn,
    DebugOff,
    /// Sent verbatim.
    Raw(String),
}

impl Command {
    /// Short name for logging.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Search(_) => "SEARCH",
            Command::Count(_) => "COUNT",
            Command::Get { .. } => "GET",
            Command::Info => "INFO",
            Command::Config => "CONFIG",
            Command::Save(_) => "SAVE",
            Command::Load(_) => "LOAD",
            Command::ReplicationStatus
            | Command::ReplicationStart
            | Command::ReplicationStop => "REPLICATION",
            Command::DebugOn | Command::DebugOff => "DEBUG",
            Command::Raw(_) => "RAW",
        }
    }

    /// Encodes the command line, without terminator, into `out`.
    pub fn encode_into(&self, out: &mut String) {
        match self {
            Command::Search(query) => {
                out.push_str("SEARCH");
                query.conditions.encode_conditions(out);
                query.encode_sort(out);
                query.encode_limit(out);
            }
            Command::Count(query) => {
                out.push_str("COUNT");
                query.encode_conditions(out);
            }
            Command::Get { table, primary_key } => {
                let _ = write!(out, "GET {table} {primary_key}");
            }
            Command::Info => out.push_str("INFO"),
            Command::Config => out.push_str("CONFIG"),
            Command::Save(None) => out.push_str("SAVE"),
            Command::Save(Some(path)) if path.is_empty() => out.push_str("SAVE"),
            Command::Save(Some(path)) => {
                let _ = write!(out, "SAVE {path}");
            }
            Command::Load(path) => {
                let _ = write!(out, "LOAD {path}");
            }
            Command::ReplicationStatus => out.push_str("REPLICATION STATUS"),
            Command::ReplicationStart => out.push_str("REPLICATION START"),
            Command::ReplicationStop => out.push_str("REPLICATION STOP"),
            Command::DebugOn => out.push_str("DEBUG ON"),
            Command::DebugOff => out.push_str("DEBUG OFF"),
            Command::Raw(line) => out.push_str(line),
        }
    }

    /// Encodes the command line, without terminator.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(64);
        self.encode_into(&mut out);
        out
    }
}

/// A decoded server response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `ERROR <message>`.
    Error(String),
    /// `OK RESULTS ...`.
    Results(SearchResponse),
    /// `OK COUNT ...`.
    Count(CountResponse),
    /// `OK DOC ...`.
    Doc(Document),
    /// `OK INFO` followed by `key: value` lines.
    Info(ServerInfo),
    /// `OK SAVED <path>`.
    Saved(String),
    /// `OK LOADED <path>`.
    Loaded(String),
    /// `OK REPLICATION k=v ...`.
    Replication(ReplicationStatus),
    /// Any other `OK <verb>` acknowledgement, kept raw.
    Ack { verb: String, raw: String },
}

impl Response {
    /// Turns `Response::Error` into `Error::Server`, passing anything else on.
    pub fn into_result(self) -> Result<Response> {
        match self {
            Response::Error(message) => Err(Error::Server(message)),
            other => Ok(other),
        }
    }
}

impl FromStr for Response {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        decode_response(line)
    }
}

/// Decodes one response line (already stripped of its trailing CRLF).
pub fn decode_response(line: &str) -> Result<Response> {
    if line == "ERROR" {
        return Ok(Response::Error(String::new()));
    }
    if let Some(message) = line.strip_prefix("ERROR ") {
        return Ok(Response::Error(message.to_string()));
    }

    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("OK") {
        return Err(Error::unexpected_response());
    }
    let verb = tokens.next().ok_or_else(Error::unexpected_response)?;

    match verb {
        "RESULTS" => decode_results(tokens).map(Response::Results),
        "COUNT" => decode_count(tokens).map(Response::Count),
        "DOC" => decode_document(tokens).map(Response::Doc),
        "INFO" => decode_info(line).map(Response::Info),
        "SAVED" => remainder_after_verb(line, verb).map(Response::Saved),
        "LOADED" => remainder_after_verb(line, verb).map(Response::Loaded),
        "REPLICATION" => Ok(Response::Replication(decode_replication(line))),
        _ => Ok(Response::Ack {
            verb: verb.to_string(),
            raw: line.to_string(),
        }),
    }
}

/// Splits whitespace-separated `key=value` tokens into ordered pairs.
///
/// Tokens without `=` are skipped; the value keeps any further `=`.
pub fn parse_key_value_pairs<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Vec<(String, String)> {
    tokens
        .into_iter()
        .filter_map(|token| token.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Projects debug pairs onto `DebugInfo`. Unknown keys are ignored.
pub fn parse_debug_info(pairs: &[(String, String)]) -> Result<DebugInfo> {
    let mut info = DebugInfo::default();
    for (key, value) in pairs {
        match key.as_str() {
            "query_time" => info.query_time_ms = Some(parse_number(key, value)?),
            "index_time" => info.index_time_ms = Some(parse_number(key, value)?),
            "filter_time" => info.filter_time_ms = Some(parse_number(key, value)?),
            "terms" => info.terms = Some(parse_number(key, value)?),
            "ngrams" => info.ngrams = Some(parse_number(key, value)?),
            "candidates" => info.candidates = Some(parse_number(key, value)?),
            "after_intersection" => info.after_intersection = Some(parse_number(key, value)?),
            "after_not" => info.after_not = Some(parse_number(key, value)?),
            "after_filters" => info.after_filters = Some(parse_number(key, value)?),
            "final" => info.final_count = Some(parse_number(key, value)?),
            "optimization" => info.optimization = Some(value.clone()),
            _ => {}
        }
    }
    Ok(info)
}

fn decode_results<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<SearchResponse> {
    let total_count = parse_leading_count(tokens.next())?;
    let (results, debug) = split_debug(tokens)?;
    Ok(SearchResponse {
        total_count,
        results,
        debug,
    })
}

fn decode_count<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<CountResponse> {
    let count = parse_leading_count(tokens.next())?;
    let (_, debug) = split_debug(tokens)?;
    Ok(CountResponse { count, debug })
}

fn decode_document<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Document> {
    let primary_key = tokens
        .next()
        .ok_or_else(|| Error::Protocol("missing primary key in DOC response".to_string()))?;
    let mut doc = Document::new(primary_key);
    for (key, value) in parse_key_value_pairs(tokens) {
        doc.insert(key, value);
    }
    Ok(doc)
}

fn decode_info(body: &str) -> Result<ServerInfo> {
    let mut info = ServerInfo::default();
    // The first line is the `OK INFO` header.
    for line in body.split('\n').skip(1) {
        if line.is_empty() || line.starts_with('#') || line.starts_with('\r') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));

        match key {
            "version" => info.version = value.to_string(),
            "uptime_seconds" => info.uptime_seconds = parse_number(key, value)?,
            "total_requests" => info.total_requests = parse_number(key, value)?,
            "active_connections" => info.active_connections = parse_number(key, value)?,
            "index_size_bytes" => info.index_size_bytes = parse_number(key, value)?,
            "doc_count" | "total_documents" => info.doc_count = parse_number(key, value)?,
            "tables" => {
                info.tables = value
                    .split(',')
                    .map(str::trim)
                    .filter(|table| !table.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }
    }
    Ok(info)
}

fn decode_replication(line: &str) -> ReplicationStatus {
    let mut status = ReplicationStatus {
        status_str: line.to_string(),
        ..ReplicationStatus::default()
    };
    for (key, value) in parse_key_value_pairs(line.split_whitespace()) {
        match key.as_str() {
            "status" => status.running = value == "running",
            "gtid" => status.gtid = value,
            _ => {}
        }
    }
    status
}

/// Splits result tokens at the `DEBUG` marker.
fn split_debug<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<(Vec<String>, Option<DebugInfo>)> {
    let mut items = Vec::new();
    let mut tokens = tokens;
    while let Some(token) = tokens.next() {
        if token == DEBUG_MARKER {
            let pairs = parse_key_value_pairs(tokens);
            return Ok((items, Some(parse_debug_info(&pairs)?)));
        }
        items.push(token.to_string());
    }
    Ok((items, None))
}

fn parse_leading_count(token: Option<&str>) -> Result<u64> {
    let token = token.ok_or_else(|| Error::Protocol("missing count in response".to_string()))?;
    parse_number("count", token)
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Protocol(format!("invalid numeric value for {key}: {value:?}")))
}

/// Returns everything after the `OK <verb>` head and one separating
/// whitespace character, verbatim. Tolerates any spacing around the head.
fn remainder_after_verb(line: &str, verb: &str) -> Result<String> {
    let rest = line
        .trim_start()
        .strip_prefix("OK")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix(verb))
        .ok_or_else(Error::unexpected_response)?;
    let mut chars = rest.chars();
    let rest = match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => rest,
    };
    Ok(rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn search(query: SearchQuery) -> String {
        Command::Search(query).encode()
    }

    #[test]
    fn escapes_only_when_needed() {
        assert_eq!(escape_query_string("hello"), "hello");
        assert!(matches!(escape_query_string("hello"), Cow::Borrowed(_)));
        assert_eq!(escape_query_string("back\\slash"), "back\\slash");
        assert_eq!(escape_query_string("hello world"), "\"hello world\"");
        assert_eq!(escape_query_string("it's"), "\"it's\"");
        assert_eq!(escape_query_string("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(escape_query_string("a\\b c"), "\"a\\\\b c\"");
        assert_eq!(escape_query_string("tab\there"), "\"tab\there\"");
    }

    #[test]
    fn search_with_offset_and_default_sort() {
        let line = search(SearchQuery::new("docs", "hello").limit(10).offset(20));
        assert_eq!(line, "SEARCH docs hello LIMIT 20,10");
    }

    #[test]
    fn search_ascending_primary_key_emits_bare_sort() {
        let line = search(
            SearchQuery::new("docs", "hello")
                .sort_by("", false)
                .limit(10)
                .offset(20),
        );
        assert_eq!(line, "SEARCH docs hello SORT ASC LIMIT 20,10");
    }

    #[test]
    fn search_with_column_sort_and_limit_only() {
        let line = search(SearchQuery::new("docs", "hello").sort_by("created_at", true).limit(5));
        assert_eq!(line, "SEARCH docs hello SORT created_at DESC LIMIT 5");

        let line = search(SearchQuery::new("docs", "hello").sort_by("score", false));
        assert_eq!(line, "SEARCH docs hello SORT score ASC");
    }

    #[test]
    fn offset_without_limit_is_not_encodable() {
        let line = search(SearchQuery::new("docs", "hello").offset(50));
        assert_eq!(line, "SEARCH docs hello");
    }

    #[test]
    fn search_with_all_clauses() {
        let query = SearchQuery::new("articles", "rust lang")
            .and("async")
            .and("tokio")
            .not("python")
            .filter("status", "published")
            .filter("author", "Jane Doe")
            .limit(3);
        assert_eq!(
            search(query),
            "SEARCH articles \"rust lang\" AND async AND tokio NOT python \
             FILTER status = published FILTER author = \"Jane Doe\" LIMIT 3"
        );
    }

    #[test]
    fn count_has_no_sort_or_limit() {
        let query = CountQuery::new("docs", "hello").and("world").not("spam").filter("lang", "en");
        assert_eq!(
            Command::Count(query).encode(),
            "COUNT docs hello AND world NOT spam FILTER lang = en"
        );
    }

    #[test]
    fn encodes_admin_commands() {
        let cases = [
            (Command::Get { table: "docs".into(), primary_key: "42".into() }, "GET docs 42"),
            (Command::Info, "INFO"),
            (Command::Config, "CONFIG"),
            (Command::Save(None), "SAVE"),
            (Command::Save(Some(String::new())), "SAVE"),
            (Command::Save(Some("/tmp/snap.db".into())), "SAVE /tmp/snap.db"),
            (Command::Load("/tmp/snap.db".into()), "LOAD /tmp/snap.db"),
            (Command::ReplicationStatus, "REPLICATION STATUS"),
            (Command::ReplicationStart, "REPLICATION START"),
            (Command::ReplicationStop, "REPLICATION STOP"),
            (Command::DebugOn, "DEBUG ON"),
            (Command::DebugOff, "DEBUG OFF"),
            (Command::Raw("PING".into()), "PING"),
        ];
        for (command, expected) in cases {
            assert_eq!(command.encode(), expected);
        }
    }

    #[test]
    fn map_terms_rewrites_query_and_terms_only() {
        let mut query = CountQuery::new("Docs", "Hello").and("World").not("Spam").filter("Lang", "EN");
        query.map_terms(|term| term.to_lowercase());
        assert_eq!(query.table, "Docs");
        assert_eq!(query.query, "hello");
        assert_eq!(query.and_terms, vec!["world"]);
        assert_eq!(query.not_terms, vec!["spam"]);
        assert_eq!(query.filters, vec![("Lang".to_string(), "EN".to_string())]);
    }

    #[test]
    fn decodes_plain_results() {
        let response = decode_response("OK RESULTS 3 a1 a2 a3").unwrap();
        assert_eq!(
            response,
            Response::Results(SearchResponse {
                total_count: 3,
                results: vec!["a1".into(), "a2".into(), "a3".into()],
                debug: None,
            })
        );
    }

    #[test]
    fn decodes_results_with_debug_block() {
        let response = decode_response("OK RESULTS 2 x1 x2 DEBUG query_time=1.5 terms=3").unwrap();
        let Response::Results(search) = response else {
            panic!("expected results, got {response:?}");
        };
        assert_eq!(search.results, vec!["x1", "x2"]);
        let debug = search.debug.expect("debug block");
        assert_eq!(debug.query_time_ms, Some(1.5));
        assert_eq!(debug.terms, Some(3));
        assert_eq!(debug.ngrams, None);
    }

    #[test]
    fn decodes_every_debug_key() {
        let line = "OK RESULTS 0 DEBUG query_time=0.25 index_time=0.1 filter_time=0 terms=2 \
                    ngrams=7 candidates=100 after_intersection=40 after_not=30 after_filters=20 \
                    final=10 optimization=merge_join unknown=1 stray";
        let Response::Results(search) = decode_response(line).unwrap() else {
            panic!("expected results");
        };
        assert!(search.results.is_empty());
        assert_eq!(
            search.debug,
            Some(DebugInfo {
                query_time_ms: Some(0.25),
                index_time_ms: Some(0.1),
                filter_time_ms: Some(0.0),
                terms: Some(2),
                ngrams: Some(7),
                candidates: Some(100),
                after_intersection: Some(40),
                after_not: Some(30),
                after_filters: Some(20),
                final_count: Some(10),
                optimization: Some("merge_join".into()),
            })
        );
    }

    #[test]
    fn bad_numbers_are_protocol_errors() {
        assert!(matches!(decode_response("OK RESULTS many a1"), Err(Error::Protocol(_))));
        assert!(matches!(decode_response("OK RESULTS"), Err(Error::Protocol(_))));
        assert!(matches!(decode_response("OK COUNT -1"), Err(Error::Protocol(_))));
        assert!(matches!(
            decode_response("OK COUNT 5 DEBUG terms=abc"),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn decodes_count() {
        assert_eq!(
            decode_response("OK COUNT 42").unwrap(),
            Response::Count(CountResponse { count: 42, debug: None })
        );
        let Response::Count(count) = decode_response("OK COUNT 7 DEBUG final=7").unwrap() else {
            panic!("expected count");
        };
        assert_eq!(count.count, 7);
        assert_eq!(count.debug.and_then(|d| d.final_count), Some(7));
    }

    #[test]
    fn decodes_document_with_duplicate_fields() {
        let Response::Doc(doc) = decode_response("OK DOC 42 title=hello lang=en title=bye expr=a=b").unwrap()
        else {
            panic!("expected document");
        };
        assert_eq!(doc.primary_key, "42");
        assert_eq!(
            doc.fields,
            vec![
                ("title".to_string(), "bye".to_string()),
                ("lang".to_string(), "en".to_string()),
                ("expr".to_string(), "a=b".to_string()),
            ]
        );
        assert!(matches!(decode_response("OK DOC"), Err(Error::Protocol(_))));
    }

    #[test]
    fn decodes_info_block() {
        let body = "OK INFO\r\n# Server\r\nversion: 1.3.0\r\nuptime_seconds: 3600\r\n\r\n\
                    total_requests: 12\r\nactive_connections: 2\r\nindex_size_bytes: 2048\r\n\
                    total_documents: 99\r\ntables: articles,,users,\r\nunknown_key: x";
        let Response::Info(info) = decode_response(body).unwrap() else {
            panic!("expected info");
        };
        assert_eq!(
            info,
            ServerInfo {
                version: "1.3.0".into(),
                uptime_seconds: 3600,
                total_requests: 12,
                active_connections: 2,
                index_size_bytes: 2048,
                doc_count: 99,
                tables: vec!["articles".into(), "users".into()],
            }
        );
        assert!(matches!(
            decode_response("OK INFO\nuptime_seconds: soon"),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn saved_and_loaded_keep_path_verbatim() {
        assert_eq!(
            decode_response("OK SAVED /var/lib/my gram/snap.db").unwrap(),
            Response::Saved("/var/lib/my gram/snap.db".into())
        );
        assert_eq!(
            decode_response("OK LOADED snap.db").unwrap(),
            Response::Loaded("snap.db".into())
        );
        assert_eq!(decode_response("OK SAVED").unwrap(), Response::Saved(String::new()));
    }

    #[test]
    fn saved_and_loaded_tolerate_irregular_spacing() {
        assert_eq!(decode_response("OK  SAVED /p").unwrap(), Response::Saved("/p".into()));
        assert_eq!(decode_response("OK\tSAVED /p").unwrap(), Response::Saved("/p".into()));
        assert_eq!(
            decode_response(" OK LOADED\t/data/snap one.db").unwrap(),
            Response::Loaded("/data/snap one.db".into())
        );
    }

    #[test]
    fn decodes_replication_status() {
        let line = "OK REPLICATION status=running gtid=3E11FA47-71CA-11E1-9E33-C80AA9429562:1-5";
        let Response::Replication(status) = decode_response(line).unwrap() else {
            panic!("expected replication");
        };
        assert!(status.running);
        assert_eq!(status.gtid, "3E11FA47-71CA-11E1-9E33-C80AA9429562:1-5");
        assert_eq!(status.status_str, line);

        let Response::Replication(status) = decode_response("OK REPLICATION status=stopped").unwrap() else {
            panic!("expected replication");
        };
        assert!(!status.running);
        assert_eq!(status.gtid, "");
    }

    #[test]
    fn error_lines_become_server_errors() {
        let response = decode_response("ERROR no such table").unwrap();
        assert_eq!(response, Response::Error("no such table".into()));
        assert_eq!(response.into_result(), Err(Error::Server("no such table".into())));
        assert_eq!(decode_response("ERROR").unwrap(), Response::Error(String::new()));
    }

    #[test]
    fn unknown_ok_verbs_are_acknowledgements() {
        assert_eq!(
            decode_response("OK DEBUG_ON").unwrap(),
            Response::Ack { verb: "DEBUG_ON".into(), raw: "OK DEBUG_ON".into() }
        );
    }

    #[test]
    fn malformed_lines_are_rejected() {
        for line in ["", "OK", "HELLO", "ok RESULTS 1", "ERRORS x"] {
            assert_eq!(
                decode_response(line),
                Err(Error::unexpected_response()),
                "line {line:?}"
            );
        }
    }

    fn unescape_quoted(quoted: &str) -> String {
        let inner = &quoted[1..quoted.len() - 1];
        let mut out = String::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    proptest! {
        #[test]
        fn escaping_is_identity_or_reversible_quoting(term in "[a-z \\t\"'\\\\]{0,16}") {
            let escaped = escape_query_string(&term);
            let special = term.chars().any(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '"' | '\''));
            if special {
                prop_assert!(escaped.starts_with('"') && escaped.ends_with('"'));
                prop_assert_eq!(unescape_quoted(&escaped), term);
            } else {
                prop_assert_eq!(&*escaped, term.as_str());
            }
        }

        #[test]
        fn results_round_trip_ids(ids in prop::collection::vec("[a-z0-9]{1,8}", 0..8)) {
            let line = format!("OK RESULTS {} {}", ids.len(), ids.join(" "));
            let Response::Results(search) = decode_response(line.trim_end()).unwrap() else {
                panic!("expected results");
            };
            prop_assert_eq!(search.total_count, ids.len() as u64);
            prop_assert_eq!(search.results, ids);
        }
    }
}
