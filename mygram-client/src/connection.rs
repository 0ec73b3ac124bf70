//! # Blocking Connection
//!
//! Purpose: Own the single TCP socket of a client and move one command line
//! out and one response frame back per call.
//!
//! ## Design Principles
//! 1. **Explicit State**: `Disconnected` / `Connected` is a real enum; there is
//!    no sentinel handle.
//! 2. **Scoped Release**: The socket lives inside the `Connected` state, so
//!    every failure path and every drop closes it.
//! 3. **Single Receive**: One `read` per command into a fixed buffer. A read
//!    that fills the buffer is rejected, not truncated: the frame may continue
//!    in the socket even when the last byte is a line break.
//! 4. **Poison On Failure**: A transport error leaves the stream in an unknown
//!    position, so the socket is dropped rather than reused.

use std::io::{ErrorKind as IoErrorKind, Read, Write};
use std::mem;
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::{debug, trace, warn};

use mygram_common::{Error, ErrorKind, Result, LINE_TERMINATOR};

use crate::config::ClientConfig;

/// Connection lifecycle.
enum ConnectionState {
    Disconnected,
    Connected(Session),
}

/// An open socket with its reusable buffers.
struct Session {
    stream: TcpStream,
    write_buf: String,
    recv_buf: Vec<u8>,
}

/// One blocking connection to the server.
pub struct Connection {
    host: String,
    port: u16,
    timeout: Option<Duration>,
    recv_buffer_size: usize,
    state: ConnectionState,
}

impl Connection {
    /// Creates a disconnected connection for `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Connection {
            host: config.host().to_string(),
            port: config.port(),
            timeout: config.timeout(),
            recv_buffer_size: config.recv_buffer_size().max(1),
            state: ConnectionState::Disconnected,
        }
    }

    /// Opens the socket.
    ///
    /// The host must be an IPv4 literal; no name resolution is done. The
    /// configured timeout bounds the connect and every later send/receive.
    ///
    /// # Errors
    /// `Connection("already connected")` if open, `Connection`/`Timeout` with
    /// the OS error text otherwise. The existing socket is left untouched.
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::Connection("already connected".to_string()));
        }

        let ip: Ipv4Addr = self
            .host
            .parse()
            .map_err(|_| Error::Connection(format!("invalid address: {}", self.host)))?;
        let addr = SocketAddr::from((ip, self.port));

        let stream = match self.timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(|err| Error::from_io("connection failed", &err))?;

        // `stream` is dropped, and closed, if any option fails.
        stream
            .set_read_timeout(self.timeout)
            .map_err(|err| Error::from_io("failed to set receive timeout", &err))?;
        stream
            .set_write_timeout(self.timeout)
            .map_err(|err| Error::from_io("failed to set send timeout", &err))?;
        // Commands are single short lines; do not wait for Nagle.
        stream
            .set_nodelay(true)
            .map_err(|err| Error::from_io("failed to set TCP_NODELAY", &err))?;

        debug!(%addr, "connected");
        self.state = ConnectionState::Connected(Session {
            stream,
            write_buf: String::with_capacity(256),
            recv_buf: vec![0u8; self.recv_buffer_size],
        });
        Ok(())
    }

    /// Closes the socket. Safe to call at any time.
    pub fn disconnect(&mut self) {
        if let ConnectionState::Connected(session) =
            mem::replace(&mut self.state, ConnectionState::Disconnected)
        {
            // The peer may already be gone; closing happens on drop either way.
            let _ = session.stream.shutdown(Shutdown::Both);
            debug!(host = %self.host, port = self.port, "disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    /// Sends `line` plus CRLF and returns the response with trailing CR/LF
    /// stripped.
    ///
    /// # Errors
    /// `Connection("not connected")` before `connect`. Transport failures,
    /// timeouts, and oversized frames also close the socket.
    pub fn send_command(&mut self, line: &str) -> Result<String> {
        let ConnectionState::Connected(session) = &mut self.state else {
            return Err(Error::Connection("not connected".to_string()));
        };

        let result = session.round_trip(line);
        if let Err(err) = &result {
            let poisoned = matches!(err, Error::FrameTooLarge { .. })
                || matches!(err.kind(), ErrorKind::Connection | ErrorKind::Timeout);
            if poisoned {
                warn!(error = %err, "dropping connection after transport failure");
                self.disconnect();
            }
        }
        result
    }
}

impl Session {
    fn round_trip(&mut self, line: &str) -> Result<String> {
        self.write_buf.clear();
        self.write_buf.push_str(line);
        self.write_buf.push_str(LINE_TERMINATOR);

        self.stream
            .write_all(self.write_buf.as_bytes())
            .and_then(|()| self.stream.flush())
            .map_err(|err| Error::from_io("failed to send command", &err))?;

        let received = loop {
            match self.stream.read(&mut self.recv_buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
                Err(err) => return Err(Error::from_io("failed to receive response", &err)),
            }
        };
        trace!(bytes = received, "received response");

        if received == 0 {
            return Err(Error::Connection("connection closed by server".to_string()));
        }
        // A full buffer cannot be told apart from a cut-off multi-line frame.
        if received == self.recv_buf.len() {
            return Err(Error::FrameTooLarge {
                limit: self.recv_buf.len(),
            });
        }
        let frame = &self.recv_buf[..received];

        let text = std::str::from_utf8(frame).map_err(|err| {
            Error::Encoding(format!(
                "response is not valid UTF-8 at byte {}",
                err.valid_up_to()
            ))
        })?;
        Ok(text.trim_end_matches(|c| c == '\r' || c == '\n').to_string())
    }
}
