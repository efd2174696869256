//! Line framing over a [`Channel`]
//!
//! Modem output is read in chunks into a buffer and handed out one
//! `\n`-terminated line at a time. The reader is created per exchange, so
//! anything still buffered when it is dropped is discarded.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use crate::cancel::CancelHandle;
use crate::channel::Channel;
use crate::error::AtError;

const READ_CHUNK: usize = 64;

/// Pause between polls of a channel with nothing to deliver
const POLL_BACKOFF: Duration = Duration::from_millis(1);

/// Buffered line reader bounded by a maximum line length
#[derive(Debug)]
pub struct LineReader<'a, C: Channel + ?Sized> {
    channel: &'a mut C,
    buf: BytesMut,
    max_len: usize,
    deadline: Option<Instant>,
    cancel: Option<&'a CancelHandle>,
}

impl<'a, C: Channel + ?Sized> LineReader<'a, C> {
    /// Create a reader returning lines of at most `max_len` bytes
    pub fn new(channel: &'a mut C, max_len: usize) -> Self {
        Self {
            channel,
            buf: BytesMut::with_capacity(max_len.min(1024)),
            max_len,
            deadline: None,
            cancel: None,
        }
    }

    /// Fail reads with [`AtError::Timeout`] once `deadline` has passed
    pub const fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Fail reads with [`AtError::Cancelled`] when `cancel` is triggered
    pub const fn with_cancel(mut self, cancel: &'a CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Read the next line, terminator included
    pub fn read_line(&mut self) -> Result<Bytes, AtError> {
        let mut scanned = 0;
        loop {
            if let Some(pos) = self.buf[scanned..].iter().position(|&b| b == b'\n') {
                let end = scanned + pos + 1;
                if end > self.max_len {
                    self.buf.advance(end);
                    return Err(self.overflow());
                }
                return Ok(self.buf.split_to(end).freeze());
            }

            scanned = self.buf.len();
            if scanned >= self.max_len {
                self.buf.clear();
                return Err(self.overflow());
            }
            self.fill()?;
        }
    }

    /// Lines buffered after an oversized one are kept. An unterminated one is
    /// dropped as far as it was read, so its tail comes back as a line of its own.
    const fn overflow(&self) -> AtError {
        AtError::LineTooLong {
            limit: self.max_len,
        }
    }

    /// Poll the channel until at least one byte arrives
    fn fill(&mut self) -> Result<(), AtError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if self.cancel.is_some_and(CancelHandle::take) {
                self.buf.clear();
                return Err(AtError::Cancelled);
            }
            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                self.buf.clear();
                return Err(AtError::Timeout);
            }

            match self.channel.recv(&mut chunk) {
                Ok(0) => thread::sleep(POLL_BACKOFF),
                Ok(n) => {
                    trace!(bytes = n, "Read from channel");
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(POLL_BACKOFF),
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                    ) => {}
                Err(e) => {
                    self.buf.clear();
                    return Err(AtError::Recv(e));
                }
            }
        }
    }
}
