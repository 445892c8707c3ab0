//! User command parsing
//!
//! Turns one frontend line into a `UserCommand`. For `create` and `update`
//! the value is everything after the single separator that follows
//! `<size>`, so values may contain (and start with) spaces.

use crate::error::{KvError, Result};
use crate::protocol::Command;
use crate::store::Key;

/// Usage block printed by `help`
pub const HELP_TEXT: &str = "\
Commands:
  connect <ip> <port>
  disconnect
  create <key> <value-size> <value>
  read <key>
  update <key> <value-size> <value>
  delete <key>
  quit | exit | help
";

/// First token of a user line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Connect,
    Disconnect,
    Create,
    Read,
    Update,
    Delete,
    Help,
    Quit,
}

impl Verb {
    /// Match a verb token, ignoring ASCII case
    pub fn parse(token: &[u8]) -> Option<Self> {
        let verbs: [(&[u8], Verb); 9] = [
            (b"connect", Verb::Connect),
            (b"disconnect", Verb::Disconnect),
            (b"create", Verb::Create),
            (b"read", Verb::Read),
            (b"update", Verb::Update),
            (b"delete", Verb::Delete),
            (b"help", Verb::Help),
            (b"quit", Verb::Quit),
            (b"exit", Verb::Quit),
        ];
        verbs
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|(_, verb)| verb)
    }

    /// Whether the verb needs a live connection
    pub fn is_server_bound(&self) -> bool {
        matches!(
            self,
            Verb::Create | Verb::Read | Verb::Update | Verb::Delete
        )
    }

    fn usage(&self) -> &'static str {
        match self {
            Verb::Connect => "connect <server-ip> <server-port>",
            Verb::Create => "create <key> <value-size> <value>",
            Verb::Update => "update <key> <value-size> <value>",
            Verb::Read => "read <key>",
            Verb::Delete => "delete <key>",
            Verb::Disconnect => "disconnect",
            Verb::Help => "help",
            Verb::Quit => "quit | exit",
        }
    }
}

/// A fully parsed user command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Connect { host: String, port: u16 },
    Disconnect,
    /// Anything that is framed and sent to the server
    Request(Command),
    Help,
    Quit,
}

/// Strip one trailing `\n` and an optional `\r` before it
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Split off the verb token; the remainder keeps its leading separator
pub fn split_verb(line: &[u8]) -> (&[u8], &[u8]) {
    let line = skip_whitespace(trim_line_end(line));
    let end = token_end(line);
    line.split_at(end)
}

/// Parse a whole line
///
/// Returns `Ok(None)` for a blank line and `UnknownCommand` for an
/// unrecognised verb.
pub fn parse_line(line: &[u8]) -> Result<Option<UserCommand>> {
    let (token, rest) = split_verb(line);
    if token.is_empty() {
        return Ok(None);
    }
    let verb = Verb::parse(token).ok_or(KvError::UnknownCommand)?;
    parse_command(verb, rest).map(Some)
}

/// Parse the arguments that follow `verb`
pub fn parse_command(verb: Verb, rest: &[u8]) -> Result<UserCommand> {
    let usage = KvError::Usage(verb.usage());

    match verb {
        Verb::Connect => {
            let mut tokens = rest
                .split(|b| b.is_ascii_whitespace())
                .filter(|t| !t.is_empty());
            let host = tokens
                .next()
                .and_then(|t| std::str::from_utf8(t).ok())
                .ok_or(KvError::Usage(verb.usage()))?;
            let port = tokens
                .next()
                .and_then(|t| parse_number::<u16>(t))
                .ok_or(usage)?;
            Ok(UserCommand::Connect {
                host: host.to_string(),
                port,
            })
        }
        Verb::Disconnect => Ok(UserCommand::Disconnect),
        Verb::Help => Ok(UserCommand::Help),
        Verb::Quit => Ok(UserCommand::Quit),
        Verb::Read | Verb::Delete => {
            let (token, tail) = next_token(rest);
            let key = parse_number::<Key>(token).ok_or(KvError::Usage(verb.usage()))?;
            if !skip_whitespace(tail).is_empty() {
                return Err(usage);
            }
            let command = if verb == Verb::Read {
                Command::Read { key }
            } else {
                Command::Delete { key }
            };
            Ok(UserCommand::Request(command))
        }
        Verb::Create | Verb::Update => {
            let (key_token, tail) = next_token(rest);
            let (size_token, tail) = next_token(tail);
            let key = parse_number::<Key>(key_token).ok_or(KvError::Usage(verb.usage()))?;
            let size = parse_size(size_token).ok_or(usage)?;

            // Exactly one separator; any further spaces belong to the value
            let value = match tail.split_first() {
                Some((b, value)) if b.is_ascii_whitespace() => value,
                _ => tail,
            };

            if value.len() != size {
                return Err(KvError::SizeMismatch {
                    declared: size,
                    actual: value.len(),
                });
            }

            let value = value.to_vec();
            let command = if verb == Verb::Create {
                Command::Create { key, value }
            } else {
                Command::Update { key, value }
            };
            Ok(UserCommand::Request(command))
        }
    }
}

// =============================================================================
// Token helpers
// =============================================================================

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn token_end(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(bytes.len())
}

/// Skip leading whitespace and split off one token
fn next_token(bytes: &[u8]) -> (&[u8], &[u8]) {
    let bytes = skip_whitespace(bytes);
    bytes.split_at(token_end(bytes))
}

fn parse_number<T: std::str::FromStr>(token: &[u8]) -> Option<T> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

fn parse_size(token: &[u8]) -> Option<usize> {
    if token.is_empty() || !token.iter().all(u8::is_ascii_digit) {
        return None;
    }
    parse_number(token)
}
