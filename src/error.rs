//! Error types for LineKV
//!
//! Provides a unified error type for all operations.
//!
//! Variants that travel over the wire render exactly the message that
//! follows `ERR ` in a reply, so `Reply::error(&err)` needs no mapping table.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for LineKV operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors (sent to the client)
    // -------------------------------------------------------------------------
    #[error("key exists")]
    KeyExists,

    #[error("no such key")]
    KeyNotFound,

    #[error("size must be > 0")]
    SizeRule,

    #[error("out of memory")]
    OutOfMemory,

    // -------------------------------------------------------------------------
    // Protocol Errors (sent to the client)
    // -------------------------------------------------------------------------
    #[error("malformed command")]
    Malformed,

    #[error("unknown command")]
    UnknownCommand,

    // -------------------------------------------------------------------------
    // Transport Errors (connection is closed)
    // -------------------------------------------------------------------------
    /// Peer closed the stream while the server was reading a value payload
    #[error("premature EOF on value")]
    PrematureEof { expected: usize, received: usize },

    /// Server reply announced more bytes than it delivered
    #[error("truncated value from server")]
    TruncatedValue { expected: usize, received: usize },

    #[error("server closed connection")]
    ConnectionClosed,

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Reply value exceeded the client's limit; its bytes were skipped
    #[error("value too large ({size} bytes, max {max})")]
    ValueTooLarge { size: usize, max: usize },

    /// Writing a request to the server failed
    #[error("send failed")]
    SendFailed(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Client-local Errors (never sent)
    // -------------------------------------------------------------------------
    #[error("not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    #[error("connect failed")]
    ConnectFailed,

    #[error("value-size ({declared}) does not match actual length ({actual})")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("usage: {0}")]
    Usage(&'static str),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// True when the error means the stream can no longer carry frames
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            KvError::Io(_)
                | KvError::PrematureEof { .. }
                | KvError::TruncatedValue { .. }
                | KvError::ConnectionClosed
                | KvError::SendFailed(_)
        )
    }
}
