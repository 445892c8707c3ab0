//! Command definitions
//!
//! Represents requests from clients.

use crate::store::Key;

/// Request verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Create,
    Update,
    Read,
    Delete,
}

impl CommandType {
    /// Canonical (uppercase) wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Create => "CREATE",
            CommandType::Update => "UPDATE",
            CommandType::Read => "READ",
            CommandType::Delete => "DELETE",
        }
    }

    /// Match a verb token, ignoring ASCII case
    pub fn from_verb(verb: &str) -> Option<Self> {
        [
            CommandType::Create,
            CommandType::Update,
            CommandType::Read,
            CommandType::Delete,
        ]
        .into_iter()
        .find(|ty| ty.as_str().eq_ignore_ascii_case(verb))
    }

    /// Whether the header carries a size and is followed by a payload
    pub fn has_payload(&self) -> bool {
        matches!(self, CommandType::Create | CommandType::Update)
    }
}

/// A parsed header line, before any payload has been read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub command_type: CommandType,
    pub key: Key,

    /// Declared payload length (always 0 for READ and DELETE)
    pub size: usize,
}

/// A complete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bind a new key
    Create { key: Key, value: Vec<u8> },

    /// Replace the value of a bound key
    Update { key: Key, value: Vec<u8> },

    /// Fetch a value
    Read { key: Key },

    /// Remove a binding
    Delete { key: Key },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Create { .. } => CommandType::Create,
            Command::Update { .. } => CommandType::Update,
            Command::Read { .. } => CommandType::Read,
            Command::Delete { .. } => CommandType::Delete,
        }
    }

    pub fn key(&self) -> Key {
        match self {
            Command::Create { key, .. }
            | Command::Update { key, .. }
            | Command::Read { key }
            | Command::Delete { key } => *key,
        }
    }

    /// Payload bytes for mutating commands
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Command::Create { value, .. } | Command::Update { value, .. } => Some(value),
            Command::Read { .. } | Command::Delete { .. } => None,
        }
    }
}
