//! Connection Handler
//!
//! Runs the request lifecycle for one client connection:
//! `IdleHeader → ParsedHeader → ReadingPayload? → Applying → Responding`.

use std::io::{self, BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{KvError, Result};
use crate::protocol::{read_command, write_response, Command, FrameLimits, Incoming, Response};
use crate::store::Store;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared key/value store
    store: Arc<Store>,

    /// Frame size limits
    limits: FrameLimits,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, store: Arc<Store>, limits: FrameLimits) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            store,
            limits,
            peer_addr,
        })
    }

    /// Disable Nagle's algorithm
    pub fn set_nodelay(&self, enabled: bool) -> Result<()> {
        self.writer.get_ref().set_nodelay(enabled)?;
        Ok(())
    }

    /// Configure connection timeouts (0 leaves the stream blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Serve requests until the client disconnects (blocking)
    ///
    /// Returns `Ok` on a clean close at a frame boundary and `Err` when the
    /// transport broke. Mutations applied before a break are kept.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Serving connection from {}", self.peer_addr);

        loop {
            let incoming = match read_command(&mut self.reader, &self.limits) {
                Ok(incoming) => incoming,
                Err(e @ KvError::PrematureEof { .. }) => {
                    tracing::warn!("Client {} closed during payload: {:?}", self.peer_addr, e);
                    // Best effort; the peer may already be gone
                    let _ = self.send_response(Response::error(&e));
                    return Err(e);
                }
                Err(KvError::Io(ref e)) if is_disconnect(e) => {
                    tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            let response = match incoming {
                Incoming::Eof => {
                    tracing::debug!("Client {} closed the connection", self.peer_addr);
                    return Ok(());
                }
                Incoming::Rejected(e) => {
                    tracing::debug!("Rejected request from {}: {}", self.peer_addr, e);
                    Response::error(&e)
                }
                Incoming::Command(command) => {
                    tracing::trace!(
                        "Received {} {} from {}",
                        command.command_type().as_str(),
                        command.key(),
                        self.peer_addr
                    );
                    self.execute_command(command)
                }
            };

            if let Err(e) = self.send_response(response) {
                if let KvError::Io(ref io_err) = e {
                    if is_disconnect(io_err) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Apply a command to the store and build its reply
    fn execute_command(&self, command: Command) -> Response {
        let result = match command {
            Command::Create { key, value } => self.store.create(key, &value).map(|_| None),
            Command::Update { key, value } => self.store.update(key, &value).map(|_| None),
            Command::Read { key } => self.store.read(key).map(Some),
            Command::Delete { key } => self.store.delete(key).map(|_| None),
        };

        match result {
            Ok(Some(value)) => Response::value(value),
            Ok(None) => Response::ok(),
            Err(e) => Response::error(&e),
        }
    }

    /// Send a response and flush it before the next read
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }
}

/// Errors that mean the peer is gone rather than the server misbehaving
fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}
