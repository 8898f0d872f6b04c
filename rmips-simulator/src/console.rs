//! The console-I/O boundary used by syscalls.
//!
//! The processor takes the console as an injected capability so the binaries
//! can hand it the real standard streams while tests script the input and
//! capture the output deterministically.

use crate::error::RuntimeError;
use std::collections::VecDeque;
use std::io;
use std::io::{BufRead, Write};

/// Blocking console I/O as seen by the syscall layer.
pub trait Console {
    /// Write bytes to the output stream and flush them.
    fn print(&mut self, bytes: &[u8]) -> Result<(), RuntimeError>;

    /// Read the next whitespace-delimited token and parse it as an integer.
    fn read_int(&mut self) -> Result<i32, RuntimeError>;

    /// Read a single byte of input.
    fn read_byte(&mut self) -> Result<u8, RuntimeError>;

    /// Read at most `limit` bytes, stopping after a newline. Returns fewer
    /// bytes only when the input ends first.
    fn read_chunk(&mut self, limit: usize) -> Result<Vec<u8>, RuntimeError>;
}

/// The process's real console: line-buffered standard input and flushed
/// standard output.
#[derive(Debug, Default)]
pub struct StdConsole {
    buffer: VecDeque<u8>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull the next line of standard input into the buffer. Returns the
    /// number of bytes read; zero means end of input.
    fn fill(&mut self) -> Result<usize, RuntimeError> {
        let stdin = io::stdin();
        let mut line = String::new();
        let count = stdin.lock().read_line(&mut line)?;
        self.buffer.extend(line.into_bytes());
        Ok(count)
    }
}

impl Console for StdConsole {
    fn print(&mut self, bytes: &[u8]) -> Result<(), RuntimeError> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(bytes)?;
        handle.flush()?;
        Ok(())
    }

    fn read_int(&mut self) -> Result<i32, RuntimeError> {
        // Skip leading whitespace, refilling as lines run out.
        loop {
            match self.buffer.front().copied() {
                Some(byte) if byte.is_ascii_whitespace() => {
                    self.buffer.pop_front();
                }
                Some(_) => break,
                None => {
                    if self.fill()? == 0 {
                        return Err(RuntimeError::UnexpectedEof);
                    }
                }
            }
        }

        let mut token = Vec::new();

        while let Some(byte) = self.buffer.front().copied() {
            if byte.is_ascii_whitespace() {
                break;
            }
            token.push(byte);
            self.buffer.pop_front();
        }

        parse_int(&token)
    }

    fn read_byte(&mut self) -> Result<u8, RuntimeError> {
        loop {
            if let Some(byte) = self.buffer.pop_front() {
                return Ok(byte);
            }

            if self.fill()? == 0 {
                return Err(RuntimeError::UnexpectedEof);
            }
        }
    }

    fn read_chunk(&mut self, limit: usize) -> Result<Vec<u8>, RuntimeError> {
        let mut bytes = Vec::new();

        while bytes.len() < limit {
            if self.buffer.is_empty() && self.fill()? == 0 {
                break;
            }

            if let Some(byte) = self.buffer.pop_front() {
                bytes.push(byte);

                if byte == b'\n' {
                    break;
                }
            }
        }

        Ok(bytes)
    }
}

/// A deterministic console double: reads come from a scripted input buffer
/// and prints accumulate in memory.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl ScriptedConsole {
    pub fn new(input: &str) -> Self {
        ScriptedConsole {
            input: input.bytes().collect(),
            output: Vec::new(),
        }
    }

    /// The bytes printed so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

impl Console for ScriptedConsole {
    fn print(&mut self, bytes: &[u8]) -> Result<(), RuntimeError> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn read_int(&mut self) -> Result<i32, RuntimeError> {
        while matches!(self.input.front(), Some(byte) if byte.is_ascii_whitespace()) {
            self.input.pop_front();
        }

        if self.input.is_empty() {
            return Err(RuntimeError::UnexpectedEof);
        }

        let mut token = Vec::new();

        while let Some(byte) = self.input.front().copied() {
            if byte.is_ascii_whitespace() {
                break;
            }
            token.push(byte);
            self.input.pop_front();
        }

        parse_int(&token)
    }

    fn read_byte(&mut self) -> Result<u8, RuntimeError> {
        self.input.pop_front().ok_or(RuntimeError::UnexpectedEof)
    }

    fn read_chunk(&mut self, limit: usize) -> Result<Vec<u8>, RuntimeError> {
        let mut bytes = Vec::new();

        while bytes.len() < limit {
            match self.input.pop_front() {
                Some(byte) => {
                    bytes.push(byte);

                    if byte == b'\n' {
                        break;
                    }
                }
                None => break,
            }
        }

        Ok(bytes)
    }
}

/// Parse a raw input token as a 32-bit integer, wrapping like every other
/// arithmetic path.
fn parse_int(token: &[u8]) -> Result<i32, RuntimeError> {
    let text = String::from_utf8_lossy(token);
    text.parse::<i64>()
        .map(|value| value as i32)
        .map_err(|_| RuntimeError::InputNotInteger(text.into_owned()))
}
