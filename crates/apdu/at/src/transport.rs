//! AT+CSIM transport implementation

use std::time::Instant;

use apdu_core::prelude::*;
use tracing::{debug, instrument, trace};

use crate::cancel::CancelHandle;
use crate::channel::Channel;
use crate::codec::HexMode;
use crate::config::AtConfig;
use crate::error::AtError;
use crate::frame::{self, CsimReply, Line};
use crate::line::LineReader;

/// Lifecycle of a transport session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Channel stopped; exchanges are refused
    Closed,
    /// Channel started
    Open,
}

/// Transport tunnelling APDUs through a modem with `AT+CSIM`
///
/// One exchange runs at a time: [`AtTransport::exchange`] takes `&mut self`,
/// so sharing a transport across threads needs an outer lock.
#[derive(Debug)]
pub struct AtTransport<C> {
    channel: C,
    config: AtConfig,
    state: SessionState,
    cancel: CancelHandle,
    resync_pending: bool,
}

impl<C: Channel> AtTransport<C> {
    /// Create a closed transport over `channel` with default configuration
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, AtConfig::default())
    }

    /// Create a closed transport over `channel`
    pub fn with_config(channel: C, config: AtConfig) -> Self {
        Self {
            channel,
            config,
            state: SessionState::Closed,
            cancel: CancelHandle::new(),
            resync_pending: false,
        }
    }

    /// Start the channel
    pub fn open(&mut self) -> Result<(), AtError> {
        if self.state == SessionState::Open {
            return Ok(());
        }

        self.channel.start().map_err(AtError::ChannelOpen)?;
        self.state = SessionState::Open;
        debug!("AT channel opened");
        Ok(())
    }

    /// Stop the channel
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        self.channel.stop();
        self.state = SessionState::Closed;
        debug!("AT channel closed");
    }

    /// Current session state
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the channel is started
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Get the configuration
    pub const fn config(&self) -> &AtConfig {
        &self.config
    }

    /// Get a reference to the channel
    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// Take the channel back
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Handle that aborts a blocked exchange from another thread
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Whether an aborted exchange may still have a reply on the way
    pub const fn needs_resync(&self) -> bool {
        self.resync_pending
    }

    /// Send `apdu` to the SIM and return its response, status word included
    ///
    /// A reply left unread by a failed exchange is drained before the next
    /// command goes out, so every response belongs to its own command.
    #[instrument(level = "trace", skip_all, fields(len = apdu.len()))]
    pub fn exchange(&mut self, apdu: &[u8]) -> Result<Bytes, AtError> {
        if self.state != SessionState::Open {
            return Err(AtError::NotOpen);
        }

        // Only the exchange in flight can be cancelled
        self.cancel.take();

        if self.resync_pending {
            self.resync()?;
        }

        let deadline = self.config.timeout.map(|timeout| Instant::now() + timeout);
        let hex_mode = self.config.hex_mode;
        let cme_errors = self.config.cme_errors;

        let command = frame::build_command(apdu);
        self.send_command(command.as_bytes())?;

        let mut reader = LineReader::new(&mut self.channel, self.config.max_line_len)
            .with_deadline(deadline)
            .with_cancel(&self.cancel);

        let result = read_reply(&mut reader, hex_mode, cme_errors);
        self.resync_pending = match &result {
            // The final result code has been read
            Ok(_) | Err(AtError::Protocol | AtError::DeviceError(_)) => false,
            Err(AtError::Recv(_)) => false,
            // The reply was read only up to the bad line
            Err(
                AtError::LineTooLong { .. }
                | AtError::MalformedReply(_)
                | AtError::InvalidHex(_),
            ) => drain(&mut reader).is_err(),
            Err(_) => true,
        };
        if self.resync_pending {
            debug!("Reply left unread, draining before the next command");
        }

        result.map(Bytes::from)
    }

    /// Discard what is left of an abandoned reply
    fn resync(&mut self) -> Result<(), AtError> {
        let deadline = Instant::now() + self.config.resync_window;
        let mut reader = LineReader::new(&mut self.channel, self.config.max_line_len)
            .with_deadline(Some(deadline))
            .with_cancel(&self.cancel);

        match drain(&mut reader) {
            Ok(()) => debug!("Drained stale reply"),
            Err(AtError::Timeout) => debug!("No stale reply arrived"),
            Err(e) => return Err(e),
        }
        self.resync_pending = false;
        Ok(())
    }

    fn send_command(&mut self, command: &[u8]) -> Result<(), AtError> {
        trace!(command = %String::from_utf8_lossy(command).trim_end(), "Sending");

        let written = self.channel.send(command).map_err(AtError::Send)?;
        if written != command.len() {
            return Err(AtError::ShortWrite {
                written,
                expected: command.len(),
            });
        }
        Ok(())
    }
}

/// Scan for `+CSIM:` or a failure line, then wait for `OK`
fn read_reply<C: Channel + ?Sized>(
    reader: &mut LineReader<'_, C>,
    hex_mode: HexMode,
    cme_errors: bool,
) -> Result<Vec<u8>, AtError> {
    let response = loop {
        let line = reader.read_line()?;
        match Line::classify(&line) {
            Line::Error => {
                debug!("Modem replied ERROR");
                return Err(AtError::Protocol);
            }
            Line::CmeError(text) if cme_errors => {
                let text = String::from_utf8_lossy(text).into_owned();
                debug!(error = %text, "Modem replied +CME ERROR");
                return Err(AtError::DeviceError(text));
            }
            Line::Csim => break CsimReply::parse(&line)?.decode(hex_mode)?,
            _ => {
                trace!(line = %String::from_utf8_lossy(&line).trim_end(), "Skipping line");
            }
        }
    };

    loop {
        let line = reader.read_line()?;
        if Line::classify(&line) == Line::Ok {
            return Ok(response);
        }
        trace!(line = %String::from_utf8_lossy(&line).trim_end(), "Awaiting OK");
    }
}

/// Read and discard lines up to the final result code of a reply
fn drain<C: Channel + ?Sized>(reader: &mut LineReader<'_, C>) -> Result<(), AtError> {
    loop {
        match reader.read_line() {
            Ok(line) => {
                if matches!(
                    Line::classify(&line),
                    Line::Ok | Line::Error | Line::CmeError(_)
                ) {
                    return Ok(());
                }
                trace!(line = %String::from_utf8_lossy(&line).trim_end(), "Discarding line");
            }
            Err(AtError::LineTooLong { .. }) => {}
            Err(e) => return Err(e),
        }
    }
}

impl<C: Channel + Send + Sync> CardTransport for AtTransport<C> {
    type Error = AtError;

    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Self::Error> {
        self.exchange(command)
    }

    fn is_connected(&self) -> bool {
        self.is_open()
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.close();
        self.open()
    }
}
