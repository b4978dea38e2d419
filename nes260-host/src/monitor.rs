//! Board output
//!
//! The board prints plain status text on the serial link. Bytes are
//! decoded as Latin-1 so line noise never fails decoding.

use std::io::{self, ErrorKind, Read};
use std::time::{Duration, Instant};

use nes260_protocol::Status;

/// Splits a byte stream into text lines
pub struct LineReader<R> {
    inner: R,
    line: String,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: String::new(),
        }
    }

    /// Read what is available and append finished lines to `lines`
    ///
    /// Returns `false` once the stream has ended. A read timeout is not an
    /// error; it just yields no lines.
    pub fn poll(&mut self, lines: &mut Vec<String>) -> io::Result<bool> {
        let mut buf = [0u8; 256];
        let n = match self.inner.read(&mut buf) {
            Ok(0) => return Ok(false),
            Ok(n) => n,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                return Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(true),
            Err(e) => return Err(e),
        };

        for &byte in &buf[..n] {
            match byte {
                b'\r' => {}
                b'\n' => lines.push(std::mem::take(&mut self.line)),
                _ => self.line.push(byte as char),
            }
        }
        Ok(true)
    }

    /// Text received since the last line break
    pub fn partial(&self) -> &str {
        &self.line
    }
}

/// Wait until the board reports a finished image load
///
/// Every line seen is passed to `on_line`. Returns `false` on timeout or
/// if the stream ends first.
pub fn wait_for_loaded<R, F>(
    reader: &mut LineReader<R>,
    timeout: Duration,
    mut on_line: F,
) -> io::Result<bool>
where
    R: Read,
    F: FnMut(&str),
{
    let deadline = Instant::now() + timeout;
    let mut lines = Vec::new();

    while Instant::now() < deadline {
        let open = reader.poll(&mut lines)?;
        for line in lines.drain(..) {
            on_line(&line);
            if Status::is_loaded_line(&line) {
                return Ok(true);
            }
        }
        if !open {
            return Ok(false);
        }
    }
    Ok(false)
}
