//! Client Module
//!
//! The client half of the protocol engine.
//!
//! ## Components
//! - `command`: parse a frontend line into a `UserCommand`
//! - `session`: the single connection slot and request/response exchange
//! - `shell`: execute lines, render outcomes, drive interactive/batch input

pub mod command;
mod session;
mod shell;

pub use command::{parse_line, UserCommand, Verb, HELP_TEXT};
pub use session::Session;
pub use shell::{Flow, Shell, PROMPT};
