//! Line transport layer for controller communication.
//!
//! This module provides the [`Transport`] trait and its TCP implementation,
//! [`TcpTransport`]. The transport layer is separated from the protocol
//! layer: it moves newline-terminated lines of text and knows nothing about
//! verbs, response codes, or field widths.
//!
//! # Design
//!
//! - **Protocol agnostic** - Handles only line transmission
//! - **Synchronous** - Blocking send/receive bounded by one timeout
//! - **Simple** - One socket, one remote address, no reconnection
//!
//! # Constants
//!
//! - [`DEFAULT_PORT`] - Default controller port (18735)
//! - [`DEFAULT_TIMEOUT`] - Default socket timeout (60 seconds)
//! - [`MAX_LINE_LENGTH`] - Longest response line accepted (4096 bytes)

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{Result, RobotError};

/// Default controller TCP port.
pub const DEFAULT_PORT: u16 = 18735;

/// Default timeout for connect, read and write operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest response line accepted, terminator included.
pub const MAX_LINE_LENGTH: usize = 4096;

/// A bidirectional, line-oriented byte pipe to a controller.
///
/// Implementations must write each line in full before returning and must
/// return exactly one line per [`recv_line`](Transport::recv_line) call, with
/// the line terminator stripped.
pub trait Transport {
    /// Writes one complete line. `line` already carries its `\n` terminator.
    fn send_line(&mut self, line: &str) -> Result<()>;

    /// Blocks until one full line has been received.
    ///
    /// Returns [`RobotError::Timeout`] if the line does not complete within
    /// the transport's timeout. Bytes of an unfinished line are kept and
    /// completed by the next call.
    fn recv_line(&mut self) -> Result<String>;

    /// Closes the underlying connection.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Blocking TCP transport.
///
/// The configured timeout applies to connecting and to every subsequent
/// read and write.
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    remote_addr: SocketAddr,
    pending: Vec<u8>,
}

impl TcpTransport {
    /// Opens a TCP connection to `host:port`.
    ///
    /// Every address `host` resolves to is tried in turn.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidArgument`] for a zero timeout and
    /// [`RobotError::Connection`] if no address accepts the connection.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mappdk::TcpTransport;
    /// use std::time::Duration;
    ///
    /// let transport = TcpTransport::connect("192.168.1.100", 18735, Duration::from_secs(5)).unwrap();
    /// ```
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(RobotError::invalid_argument(
                "socket_timeout",
                "must be greater than zero",
            ));
        }

        let address = format!("{}:{}", host, port);
        let candidates = (host, port)
            .to_socket_addrs()
            .map_err(|e| RobotError::connection(&address, e))?;

        let mut last_error = io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "host did not resolve to any address",
        );
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(stream) => {
                    debug!(remote = %candidate, "TCP connection established");
                    return Self::from_stream(stream, timeout)
                        .map_err(|e| RobotError::connection(&address, e));
                }
                Err(e) => {
                    debug!(remote = %candidate, error = %e, "TCP connect attempt failed");
                    last_error = e;
                }
            }
        }

        Err(RobotError::connection(address, last_error))
    }

    fn from_stream(stream: TcpStream, timeout: Duration) -> io::Result<Self> {
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        let remote_addr = stream.peer_addr()?;
        let writer = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            remote_addr,
            pending: Vec::new(),
        })
    }

    /// Returns the remote controller address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}

fn map_io(e: io::Error) -> RobotError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => RobotError::Timeout,
        _ => RobotError::Io(e),
    }
}

impl Transport for TcpTransport {
    fn send_line(&mut self, line: &str) -> Result<()> {
        trace!(bytes = line.len(), "writing line");
        self.writer.write_all(line.as_bytes()).map_err(map_io)?;
        self.writer.flush().map_err(map_io)
    }

    fn recv_line(&mut self) -> Result<String> {
        // Bytes read before a timeout stay in `pending` for the next call.
        let remaining = MAX_LINE_LENGTH.saturating_sub(self.pending.len()) as u64;
        (&mut self.reader)
            .take(remaining)
            .read_until(b'\n', &mut self.pending)
            .map_err(map_io)?;

        if self.pending.last() != Some(&b'\n') {
            let partial = std::mem::take(&mut self.pending);
            if partial.len() >= MAX_LINE_LENGTH {
                return Err(RobotError::unknown_response(
                    String::from_utf8_lossy(&partial).into_owned(),
                ));
            }
            let reason = if partial.is_empty() {
                "controller closed the connection"
            } else {
                "connection closed mid-line"
            };
            return Err(RobotError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                reason,
            )));
        }

        let mut buffer = std::mem::take(&mut self.pending);
        buffer.pop();
        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }

        String::from_utf8(buffer)
            .map_err(|e| RobotError::unknown_response(String::from_utf8_lossy(e.as_bytes())))
    }

    fn close(&mut self) -> Result<()> {
        match self.writer.shutdown(std::net::Shutdown::Both) {
            Ok(()) => Ok(()),
            // The peer may already have gone away.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(RobotError::Io(e)),
        }
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("remote_addr", &self.remote_addr)
            .field("local_addr", &self.writer.local_addr().ok())
            .field("pending_bytes", &self.pending.len())
            .finish()
    }
}
