//! Command shell
//!
//! Executes user lines against a `Session` and renders outcomes. The
//! interactive and batch frontends are thin loops over `execute_line`.

use std::io::{BufRead, Write};

use super::command::{parse_command, split_verb, trim_line_end, UserCommand, Verb, HELP_TEXT};
use super::Session;
use crate::error::{KvError, Result};
use crate::protocol::Response;

/// Prompt shown by the interactive frontend
pub const PROMPT: &str = "kv> ";

/// Whether the frontend should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs user commands and writes their outcome to `out`
pub struct Shell<W: Write> {
    session: Session,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(out: W) -> Self {
        Self::with_session(Session::new(), out)
    }

    pub fn with_session(session: Session, out: W) -> Self {
        Self { session, out }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Execute one user line
    ///
    /// Per-command errors are printed, never returned; `Err` only reports a
    /// failure to write to `out`.
    pub fn execute_line(&mut self, line: &[u8]) -> Result<Flow> {
        let (token, rest) = split_verb(line);
        if token.is_empty() {
            return Ok(Flow::Continue);
        }

        let Some(verb) = Verb::parse(token) else {
            writeln!(self.out, "ERR unknown command (type 'help')")?;
            return self.flush(Flow::Continue);
        };

        if verb.is_server_bound() && !self.session.is_connected() {
            self.print_error(&KvError::NotConnected)?;
            return self.flush(Flow::Continue);
        }

        let flow = match parse_command(verb, rest) {
            Ok(command) => self.dispatch(command)?,
            Err(e) => {
                self.print_error(&e)?;
                Flow::Continue
            }
        };
        self.flush(flow)
    }

    /// Read commands from `input` with a prompt until EOF or `quit`
    pub fn run_interactive<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        let mut line = Vec::new();
        loop {
            write!(self.out, "{}", PROMPT)?;
            self.out.flush()?;

            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }
            if self.execute_line(&line)? == Flow::Quit {
                break;
            }
        }
        self.finish()
    }

    /// Read commands from `input` without a prompt
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn run_batch<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                break;
            }

            let content = trim_line_end(&line);
            if content.iter().all(u8::is_ascii_whitespace) || content.starts_with(b"#") {
                continue;
            }
            if self.execute_line(&line)? == Flow::Quit {
                break;
            }
        }
        self.finish()
    }

    fn dispatch(&mut self, command: UserCommand) -> Result<Flow> {
        match command {
            UserCommand::Connect { host, port } => {
                match self.session.connect(&host, port) {
                    Ok(_) => writeln!(self.out, "OK")?,
                    Err(e) => self.print_error(&e)?,
                }
            }
            UserCommand::Disconnect => {
                self.session.disconnect();
                writeln!(self.out, "OK")?;
            }
            UserCommand::Help => self.out.write_all(HELP_TEXT.as_bytes())?,
            UserCommand::Quit => {
                self.session.disconnect();
                return Ok(Flow::Quit);
            }
            UserCommand::Request(command) => match self.session.request(&command) {
                Ok(response) => self.print_response(&response)?,
                Err(e) => self.print_error(&e)?,
            },
        }
        Ok(Flow::Continue)
    }

    fn print_response(&mut self, response: &Response) -> Result<()> {
        match response {
            Response::Ok => writeln!(self.out, "OK")?,
            Response::Value(value) => {
                self.out.write_all(value)?;
                writeln!(self.out)?;
            }
            Response::Error(message) if message.is_empty() => writeln!(self.out, "ERR")?,
            Response::Error(message) => writeln!(self.out, "ERR {}", message)?,
        }
        Ok(())
    }

    fn print_error(&mut self, err: &KvError) -> Result<()> {
        writeln!(self.out, "ERR {}", err)?;
        Ok(())
    }

    fn flush(&mut self, flow: Flow) -> Result<Flow> {
        self.out.flush()?;
        Ok(flow)
    }

    fn finish(&mut self) -> Result<()> {
        self.session.disconnect();
        self.out.flush()?;
        Ok(())
    }
}
