//! Configuration for LineKV
//!
//! Centralized configuration with sensible defaults.

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::{KvError, Result};
use crate::protocol::FrameLimits;

/// Largest value a single binding may hold (1 MiB)
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1024 * 1024;

/// Longest accepted header line, excluding the terminator
pub const DEFAULT_MAX_HEADER_LEN: usize = 4096;

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Main configuration for a LineKV server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address (IPv4 only)
    pub listen_addr: SocketAddrV4,

    /// Disable Nagle's algorithm on accepted connections
    pub nodelay: bool,

    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Upper bound on a value payload in bytes
    pub max_value_size: usize,

    /// Upper bound on a header line in bytes
    pub max_header_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT),
            nodelay: true,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Frame size limits derived from this config
    pub fn limits(&self) -> FrameLimits {
        FrameLimits {
            max_value_size: self.max_value_size,
            max_header_len: self.max_header_len,
        }
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_header_len == 0 {
            return Err(KvError::Config("max_header_len must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: SocketAddrV4) -> Self {
        self.config.listen_addr = addr;
        self
    }

    /// Toggle TCP_NODELAY on accepted sockets
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.config.nodelay = enabled;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum value size (in bytes)
    pub fn max_value_size(mut self, size: usize) -> Self {
        self.config.max_value_size = size;
        self
    }

    /// Set the maximum header line length (in bytes)
    pub fn max_header_len(mut self, len: usize) -> Self {
        self.config.max_header_len = len;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
