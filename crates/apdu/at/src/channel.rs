//! Byte channels the AT transport runs over
//!
//! The transport never opens devices itself. It is handed a [`Channel`] and
//! only drives its four operations.

use std::fmt;
use std::io::{self, Read, Write};

use tracing::debug;

/// A bidirectional byte stream to a modem
pub trait Channel: fmt::Debug {
    /// Bring the channel up
    fn start(&mut self) -> io::Result<()>;

    /// Tear the channel down
    fn stop(&mut self);

    /// Write `data`, returning how many bytes were accepted
    fn send(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Read into `buf`, returning how many bytes arrived
    ///
    /// `Ok(0)` means nothing was available yet; callers poll again.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn start(&mut self) -> io::Result<()> {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).send(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buf)
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn start(&mut self) -> io::Result<()> {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).send(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buf)
    }
}

/// Channel over any `Read + Write` stream
///
/// Starting and stopping only gate access; the stream itself is opened and
/// closed by whoever constructed it. A read of zero bytes is end of stream and
/// surfaces as [`io::ErrorKind::UnexpectedEof`], so a stream with no data yet
/// must report [`io::ErrorKind::WouldBlock`] instead.
#[derive(Debug)]
pub struct IoChannel<T> {
    inner: T,
    started: bool,
}

impl<T> IoChannel<T> {
    /// Wrap a stream
    pub const fn new(inner: T) -> Self {
        Self {
            inner,
            started: false,
        }
    }

    /// Get a reference to the wrapped stream
    pub const fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn not_started() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "channel not started")
}

impl<T: Read + Write + fmt::Debug> Channel for IoChannel<T> {
    fn start(&mut self) -> io::Result<()> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        if self.started {
            if let Err(e) = self.inner.flush() {
                debug!(error = %e, "Flush failed while stopping channel");
            }
            self.started = false;
        }
    }

    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        if !self.started {
            return Err(not_started());
        }
        let written = self.inner.write(data)?;
        self.inner.flush()?;
        Ok(written)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.started {
            return Err(not_started());
        }
        match self.inner.read(buf)? {
            0 if !buf.is_empty() => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream closed",
            )),
            n => Ok(n),
        }
    }
}

#[cfg(test)]
pub(crate) use mock::MockChannel;

#[cfg(test)]
mod mock {
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    use super::*;

    #[derive(Debug)]
    enum Incoming {
        Data(Vec<u8>),
        Error(io::ErrorKind),
        /// Nothing arrives for a while, timed from the first poll that hits it
        Pause(Duration, Option<Instant>),
    }

    /// Scripted modem for unit tests
    ///
    /// Incoming chunks are only released once a frame has been sent, so a
    /// test also checks that every exchange writes before it reads.
    #[derive(Debug, Default)]
    pub(crate) struct MockChannel {
        incoming: VecDeque<Incoming>,
        pub(crate) written: Vec<u8>,
        pub(crate) started: bool,
        pub(crate) stop_calls: usize,
        fail_start: bool,
        send_limit: Option<usize>,
        fail_send: bool,
    }

    impl MockChannel {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Queue bytes the modem will emit
        pub(crate) fn reply(mut self, bytes: &[u8]) -> Self {
            self.incoming.push_back(Incoming::Data(bytes.to_vec()));
            self
        }

        /// Queue a silent gap before the next scripted entry
        pub(crate) fn pause(mut self, duration: Duration) -> Self {
            self.incoming.push_back(Incoming::Pause(duration, None));
            self
        }

        /// Queue a recv failure
        pub(crate) fn recv_error(mut self, kind: io::ErrorKind) -> Self {
            self.incoming.push_back(Incoming::Error(kind));
            self
        }

        pub(crate) const fn fail_start(mut self) -> Self {
            self.fail_start = true;
            self
        }

        pub(crate) const fn fail_send(mut self) -> Self {
            self.fail_send = true;
            self
        }

        pub(crate) const fn send_limit(mut self, limit: usize) -> Self {
            self.send_limit = Some(limit);
            self
        }

        pub(crate) fn written_str(&self) -> &str {
            std::str::from_utf8(&self.written).unwrap()
        }
    }

    impl Channel for MockChannel {
        fn start(&mut self) -> io::Result<()> {
            if self.fail_start {
                return Err(io::ErrorKind::NotFound.into());
            }
            self.started = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.started = false;
            self.stop_calls += 1;
        }

        fn send(&mut self, data: &[u8]) -> io::Result<usize> {
            if self.fail_send {
                return Err(io::ErrorKind::BrokenPipe.into());
            }
            let n = self.send_limit.map_or(data.len(), |limit| limit.min(data.len()));
            self.written.extend_from_slice(&data[..n]);
            Ok(n)
        }

        fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.written.is_empty() {
                return Ok(0);
            }
            match self.incoming.pop_front() {
                None => Ok(0),
                Some(Incoming::Error(kind)) => Err(kind.into()),
                Some(Incoming::Pause(duration, started)) => {
                    let started = started.unwrap_or_else(Instant::now);
                    if started.elapsed() < duration {
                        self.incoming
                            .push_front(Incoming::Pause(duration, Some(started)));
                    }
                    Ok(0)
                }
                Some(Incoming::Data(mut chunk)) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.incoming.push_front(Incoming::Data(chunk.split_off(n)));
                    }
                    Ok(n)
                }
            }
        }
    }
}
