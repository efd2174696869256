//! Common test utilities

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Simulated modem answering `AT+CSIM` frames from a script
///
/// Every complete command line written is echoed back (as modems do with
/// `ATE1`) followed by the scripted reply, or `ERROR` if none matches. Reads
/// with nothing to deliver report `WouldBlock`, like a non-blocking port.
#[derive(Debug, Default)]
pub struct SimModem {
    replies: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
    pending: Vec<u8>,
    scheduled: VecDeque<(Instant, Vec<u8>)>,
    output: VecDeque<u8>,
    /// Every command line received, terminator stripped
    pub commands: Vec<String>,
    /// Bytes handed out per read, zero for unlimited
    pub read_size: usize,
}

impl SimModem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` (without terminator) with `reply`
    pub fn on(mut self, command: &str, reply: &[u8]) -> Self {
        self.replies.insert(command.to_string(), reply.to_vec());
        self
    }

    /// Hold back the reply to `command` for `delay` after it is received
    pub fn delay(mut self, command: &str, delay: Duration) -> Self {
        self.delays.insert(command.to_string(), delay);
        self
    }

    /// Hand out at most `n` bytes per read
    pub const fn trickle(mut self, n: usize) -> Self {
        self.read_size = n;
        self
    }

    fn release_due(&mut self) {
        let now = Instant::now();
        while self.scheduled.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, bytes)) = self.scheduled.pop_front() {
                self.output.extend(bytes);
            }
        }
    }
}

impl Write for SimModem {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.windows(2).position(|w| w == b"\r\n") {
            let line: Vec<u8> = self.pending.drain(..pos + 2).collect();
            let command = String::from_utf8_lossy(&line[..pos]).into_owned();

            let mut answer = line[..pos].to_vec();
            answer.extend_from_slice(b"\r\r\n");
            match self.replies.get(&command) {
                Some(reply) => answer.extend_from_slice(reply),
                None => answer.extend_from_slice(b"\r\nERROR\r\n"),
            }

            let delay = self.delays.get(&command).copied().unwrap_or_default();
            let due = self
                .scheduled
                .back()
                .map_or(Instant::now() + delay, |(at, _)| (*at).max(Instant::now() + delay));
            self.scheduled.push_back((due, answer));
            self.commands.push(command);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for SimModem {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.release_due();
        if self.output.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }

        let limit = if self.read_size == 0 {
            buf.len()
        } else {
            self.read_size.min(buf.len())
        };
        let n = limit.min(self.output.len());
        for (dst, src) in buf.iter_mut().zip(self.output.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}
