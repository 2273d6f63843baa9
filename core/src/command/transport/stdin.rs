//! Non-blocking stdin command reader

use std::io::{self, Write};

use retrocmd_shared::STDIN_BUFFER_SIZE;

use super::error::TransportError;
use crate::command::parser::process_batch;
use crate::command::reply::WriterReply;
use crate::command::state::CommandState;
use crate::command::ActionHandler;

/// Byte stream that can be read without blocking.
pub trait ByteSource {
    /// Read whatever is available right now. `Ok(0)` means nothing was ready.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Process stdin, checked with a zero-timeout poll before every read.
#[cfg(unix)]
pub struct StdinSource {
    eof: bool,
}

#[cfg(unix)]
impl StdinSource {
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self { eof: false })
    }
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use nix::errno::Errno;
        use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
        use std::os::fd::{AsFd, AsRawFd};

        if self.eof || buf.is_empty() {
            return Ok(0);
        }

        let stdin = io::stdin();
        let mut fds = [PollFd::new(stdin.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::ZERO) {
            Ok(0) | Err(Errno::EINTR) => return Ok(0),
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }

        // Read the descriptor directly; std's buffered handle would hide
        // pending bytes from the next readiness check.
        let n = match nix::unistd::read(stdin.as_raw_fd(), buf) {
            Ok(n) => n,
            Err(Errno::EAGAIN | Errno::EINTR) => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            tracing::info!("stdin closed, no more commands will be read");
            self.eof = true;
        }
        Ok(n)
    }
}

#[cfg(not(unix))]
pub struct StdinSource;

#[cfg(not(unix))]
impl StdinSource {
    pub fn new() -> Result<Self, TransportError> {
        Err(TransportError::StdinUnsupported)
    }
}

#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn read_available(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

/// Accumulates stdin bytes and dispatches complete lines.
pub struct StdinListener {
    source: Box<dyn ByteSource>,
    output: Box<dyn Write>,
    buf: Box<[u8; STDIN_BUFFER_SIZE]>,
    len: usize,
}

impl StdinListener {
    /// Listen on process stdin, replying on stdout.
    pub fn stdio() -> Result<Self, TransportError> {
        Ok(Self::new(
            Box::new(StdinSource::new()?),
            Box::new(io::stdout()),
        ))
    }

    pub fn new(source: Box<dyn ByteSource>, output: Box<dyn Write>) -> Self {
        Self {
            source,
            output,
            buf: Box::new([0u8; STDIN_BUFFER_SIZE]),
            len: 0,
        }
    }

    /// Bytes waiting for a newline.
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// One read, then dispatch every complete line. Returns the number of
    /// bytes consumed as lines.
    pub fn drain(&mut self, state: &mut CommandState, handler: &mut dyn ActionHandler) -> usize {
        let read = match self.source.read_available(&mut self.buf[self.len..]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => 0,
            Err(e) => {
                tracing::warn!("stdin read failed: {e}");
                0
            }
        };
        if read == 0 {
            return 0;
        }
        self.len += read;

        let Some(last_newline) = self.buf[..self.len].iter().rposition(|b| *b == b'\n') else {
            if self.len == self.buf.len() {
                tracing::warn!(
                    len = self.len,
                    "stdin buffer full without a newline, discarding"
                );
                self.len = 0;
            }
            return 0;
        };

        let end = last_newline + 1;
        {
            let text = String::from_utf8_lossy(&self.buf[..end]);
            let mut reply = WriterReply::new(&mut *self.output);
            process_batch(&text, state, handler, &mut reply);
        }

        self.buf.copy_within(end..self.len, 0);
        self.len -= end;
        end
    }
}
