//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Request Format
//! ```text
//! ┌──────────────────────────────┬──────────────────────┐
//! │ VERB <key> [<size>] \n       │ <size> raw bytes     │
//! └──────────────────────────────┴──────────────────────┘
//! ```
//!
//! ### Commands
//! - `CREATE <key> <size>` - Payload: value
//! - `UPDATE <key> <size>` - Payload: value (size > 0)
//! - `READ <key>`          - Payload: none
//! - `DELETE <key>`        - Payload: none
//!
//! Verbs are case-insensitive; a `\r` before the `\n` is stripped.
//!
//! ## Response Format
//! ```text
//! OK\n
//! OK <size>\n<size raw bytes>
//! ERR <message>\n
//! ```

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType, Header};
pub use response::Response;
pub use codec::{
    encode_command, encode_response, parse_header, read_command, read_line, read_response,
    write_command, write_response, FrameLimits, Incoming, Line,
};
