//! Response definitions
//!
//! Represents replies to clients.

use bytes::Bytes;

use crate::error::KvError;

/// A reply frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK` with no payload
    Ok,

    /// `OK <size>` followed by the value bytes
    Value(Bytes),

    /// `ERR <message>`
    Error(String),
}

impl Response {
    /// Create an OK response
    pub fn ok() -> Self {
        Response::Ok
    }

    /// Create an OK response carrying a value
    pub fn value(value: impl Into<Bytes>) -> Self {
        Response::Value(value.into())
    }

    /// Create an ERR response from an error
    ///
    /// Newlines are flattened so the message stays on one header line.
    pub fn error(err: &KvError) -> Self {
        Response::Error(err.to_string().replace(['\r', '\n'], " "))
    }
}
