//! Client session
//!
//! Owns the single connection slot and performs request/response exchanges.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use crate::error::{KvError, Result};
use crate::protocol::{read_response, write_command, Command, FrameLimits, Response};

/// Buffered halves of a live connection
struct Link {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    peer_addr: SocketAddr,
}

/// A client's view of at most one server connection
pub struct Session {
    link: Option<Link>,
    limits: FrameLimits,
}

impl Session {
    /// Create a disconnected session with default frame limits
    pub fn new() -> Self {
        Self::with_limits(FrameLimits::default())
    }

    /// Create a disconnected session that accepts replies up to `limits`
    pub fn with_limits(limits: FrameLimits) -> Self {
        Self { link: None, limits }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Address of the connected server
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.link.as_ref().map(|link| link.peer_addr)
    }

    /// Open a connection, trying each IPv4 address `host` resolves to
    pub fn connect(&mut self, host: &str, port: u16) -> Result<SocketAddr> {
        if self.link.is_some() {
            return Err(KvError::AlreadyConnected);
        }

        let addrs = (host, port).to_socket_addrs().map_err(|e| {
            tracing::debug!("Failed to resolve {}: {}", host, e);
            KvError::ConnectFailed
        })?;

        for addr in addrs.filter(SocketAddr::is_ipv4) {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    let read_stream = stream.try_clone()?;
                    self.link = Some(Link {
                        reader: BufReader::new(read_stream),
                        writer: BufWriter::new(stream),
                        peer_addr: addr,
                    });
                    tracing::debug!("Connected to {}", addr);
                    return Ok(addr);
                }
                Err(e) => tracing::debug!("Connect to {} failed: {}", addr, e),
            }
        }

        Err(KvError::ConnectFailed)
    }

    /// Drop the connection; returns whether one was open
    pub fn disconnect(&mut self) -> bool {
        match self.link.take() {
            Some(link) => {
                tracing::debug!("Disconnected from {}", link.peer_addr);
                true
            }
            None => false,
        }
    }

    /// Send one command and wait for its reply
    ///
    /// Transport failures close the connection before the error is returned.
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        let link = self.link.as_mut().ok_or(KvError::NotConnected)?;

        let result = write_command(&mut link.writer, command)
            .map_err(|e| match e {
                KvError::Io(io_err) => KvError::SendFailed(io_err),
                other => other,
            })
            .and_then(|()| {
                read_response(&mut link.reader, &self.limits).map_err(|e| match e {
                    KvError::Io(io_err) => {
                        tracing::debug!("Receive failed: {}", io_err);
                        KvError::ConnectionClosed
                    }
                    other => other,
                })
            });

        if let Err(ref e) = result {
            if e.is_transport() {
                tracing::debug!("Dropping connection after error: {}", e);
                self.link = None;
            }
        }
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
