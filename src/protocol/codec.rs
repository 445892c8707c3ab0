//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! Header lines are read through a `BufRead` with a hard length limit, so a
//! peer can never make the server buffer an unbounded line. Payloads are
//! read with `take` so exactly `size` bytes are consumed and framing stays
//! aligned for the next request.

use std::io::{self, BufRead, Read, Write};

use bytes::Bytes;

use super::{Command, CommandType, Header, Response};
use crate::config::{DEFAULT_MAX_HEADER_LEN, DEFAULT_MAX_VALUE_SIZE};
use crate::error::{KvError, Result};
use crate::store::Key;

/// Size limits applied while decoding frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    /// Largest accepted payload
    pub max_value_size: usize,

    /// Longest accepted header line, excluding `\r\n`
    pub max_header_len: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
        }
    }
}

/// Outcome of reading one header line
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// Line content without its terminator
    Complete(Vec<u8>),

    /// Line exceeded the limit; it has been drained up to and including `\n`
    TooLong,

    /// Stream ended cleanly before any byte of a new line
    Eof,
}

/// Outcome of reading one request from the server's side of a stream
#[derive(Debug)]
pub enum Incoming {
    /// A complete, well-formed request
    Command(Command),

    /// The frame was consumed but must be answered with `ERR`
    Rejected(KvError),

    /// Peer closed the stream between requests
    Eof,
}

// =============================================================================
// Line Reading
// =============================================================================

/// Read one `\n`-terminated line, stripping a trailing `\r`
///
/// A stream that ends in the middle of a line is an `UnexpectedEof` error.
pub fn read_line<R: BufRead>(reader: &mut R, max_len: usize) -> Result<Line> {
    // Room for the content plus "\r\n"
    let limit = max_len as u64 + 2;

    let mut line = Vec::new();
    let n = reader.by_ref().take(limit).read_until(b'\n', &mut line)?;
    if n == 0 {
        return Ok(Line::Eof);
    }

    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.len() > max_len {
            return Ok(Line::TooLong);
        }
        return Ok(Line::Complete(line));
    }

    if (line.len() as u64) < limit {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stream closed in the middle of a header line",
        )
        .into());
    }

    skip_line(reader)?;
    Ok(Line::TooLong)
}

/// Discard input up to and including the next `\n`
fn skip_line<R: BufRead>(reader: &mut R) -> Result<()> {
    loop {
        let (consumed, found) = {
            let buf = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if buf.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream closed in the middle of a header line",
                )
                .into());
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (buf.len(), false),
            }
        };
        reader.consume(consumed);
        if found {
            return Ok(());
        }
    }
}

// =============================================================================
// Header Parsing
// =============================================================================

/// Parse a request header line (terminator already stripped)
///
/// Unknown verbs give `UnknownCommand`; anything else that does not fit
/// the grammar gives `Malformed`. The size limit is not checked here.
pub fn parse_header(line: &[u8]) -> Result<Header> {
    let text = std::str::from_utf8(line).map_err(|_| KvError::Malformed)?;
    let mut tokens = text.split_ascii_whitespace();

    let verb = tokens.next().ok_or(KvError::Malformed)?;
    let command_type = CommandType::from_verb(verb).ok_or(KvError::UnknownCommand)?;

    let key = tokens
        .next()
        .and_then(|t| t.parse::<Key>().ok())
        .ok_or(KvError::Malformed)?;

    let size = if command_type.has_payload() {
        tokens.next().and_then(parse_size).ok_or(KvError::Malformed)?
    } else {
        0
    };

    if tokens.next().is_some() {
        return Err(KvError::Malformed);
    }

    Ok(Header {
        command_type,
        key,
        size,
    })
}

/// Plain decimal digits only; no sign
fn parse_size(token: &str) -> Option<usize> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: `VERB key [size]\n` + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let verb = command.command_type().as_str();
    let key = command.key();

    match command.value() {
        Some(value) => {
            let header = format!("{} {} {}\n", verb, key, value.len());
            let mut message = Vec::with_capacity(header.len() + value.len());
            message.extend_from_slice(header.as_bytes());
            message.extend_from_slice(value);
            message
        }
        None => format!("{} {}\n", verb, key).into_bytes(),
    }
}

/// Read a complete request from a stream
///
/// Protocol violations are returned as `Incoming::Rejected` once the frame
/// has been fully consumed. `Err` means the stream is no longer usable.
pub fn read_command<R: BufRead>(reader: &mut R, limits: &FrameLimits) -> Result<Incoming> {
    let line = match read_line(reader, limits.max_header_len)? {
        Line::Complete(line) => line,
        Line::TooLong => return Ok(Incoming::Rejected(KvError::Malformed)),
        Line::Eof => return Ok(Incoming::Eof),
    };

    let header = match parse_header(&line) {
        Ok(header) => header,
        Err(e) => return Ok(Incoming::Rejected(e)),
    };

    let key = header.key;
    let command_type = header.command_type;

    match command_type {
        CommandType::Read => Ok(Incoming::Command(Command::Read { key })),
        CommandType::Delete => Ok(Incoming::Command(Command::Delete { key })),
        CommandType::Create | CommandType::Update => {
            if command_type == CommandType::Update && header.size == 0 {
                return Ok(Incoming::Rejected(KvError::SizeRule));
            }

            if header.size > limits.max_value_size {
                drain_payload(reader, header.size)?;
                return Ok(Incoming::Rejected(KvError::Malformed));
            }

            let mut value = Vec::new();
            if value.try_reserve_exact(header.size).is_err() {
                drain_payload(reader, header.size)?;
                return Ok(Incoming::Rejected(KvError::OutOfMemory));
            }

            let received = fill_payload(reader, &mut value, header.size)?;
            if received < header.size {
                return Err(KvError::PrematureEof {
                    expected: header.size,
                    received,
                });
            }

            let command = if command_type == CommandType::Create {
                Command::Create { key, value }
            } else {
                Command::Update { key, value }
            };
            Ok(Incoming::Command(command))
        }
    }
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Vec<u8> {
    match response {
        Response::Ok => b"OK\n".to_vec(),
        Response::Value(value) => {
            let header = format!("OK {}\n", value.len());
            let mut message = Vec::with_capacity(header.len() + value.len());
            message.extend_from_slice(header.as_bytes());
            message.extend_from_slice(value);
            message
        }
        Response::Error(message) => format!("ERR {}\n", message).into_bytes(),
    }
}

/// Read a complete response from a stream
pub fn read_response<R: BufRead>(reader: &mut R, limits: &FrameLimits) -> Result<Response> {
    let line = match read_line(reader, limits.max_header_len)? {
        Line::Complete(line) => line,
        Line::TooLong => {
            return Err(KvError::UnexpectedResponse(
                "header line too long".to_string(),
            ))
        }
        Line::Eof => return Err(KvError::ConnectionClosed),
    };
    let text = String::from_utf8_lossy(&line);

    if text == "OK" {
        return Ok(Response::Ok);
    }

    if let Some(rest) = text.strip_prefix("OK ") {
        let size = parse_size(rest)
            .ok_or_else(|| KvError::UnexpectedResponse(text.to_string()))?;

        // Oversized or unallocatable values are skipped so the next reply
        // still starts on a header line
        if size > limits.max_value_size {
            skip_reply_payload(reader, size)?;
            return Err(KvError::ValueTooLarge {
                size,
                max: limits.max_value_size,
            });
        }

        let mut value = Vec::new();
        if value.try_reserve_exact(size).is_err() {
            skip_reply_payload(reader, size)?;
            return Err(KvError::OutOfMemory);
        }
        let received = fill_payload(reader, &mut value, size)?;
        if received < size {
            return Err(KvError::TruncatedValue {
                expected: size,
                received,
            });
        }
        return Ok(Response::Value(Bytes::from(value)));
    }

    if text == "ERR" {
        return Ok(Response::Error(String::new()));
    }
    if let Some(message) = text.strip_prefix("ERR ") {
        return Ok(Response::Error(message.to_string()));
    }

    Err(KvError::UnexpectedResponse(text.to_string()))
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Payload helpers
// =============================================================================

/// Append up to `size` bytes to `buf`, returning how many arrived
fn fill_payload<R: Read>(reader: &mut R, buf: &mut Vec<u8>, size: usize) -> Result<usize> {
    let received = reader.by_ref().take(size as u64).read_to_end(buf)?;
    Ok(received)
}

/// Consume a reply payload, reporting a short read as a truncated value
fn skip_reply_payload<R: Read>(reader: &mut R, size: usize) -> Result<()> {
    drain_payload(reader, size).map_err(|e| match e {
        KvError::PrematureEof { expected, received } => {
            KvError::TruncatedValue { expected, received }
        }
        other => other,
    })
}

/// Consume a payload without buffering it
fn drain_payload<R: Read>(reader: &mut R, size: usize) -> Result<()> {
    let drained = io::copy(&mut reader.by_ref().take(size as u64), &mut io::sink())?;
    if drained < size as u64 {
        return Err(KvError::PrematureEof {
            expected: size,
            received: drained as usize,
        });
    }
    Ok(())
}
