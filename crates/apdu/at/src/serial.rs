//! Serial port channel backed by the `serialport` crate

use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

use parking_lot::Mutex;
use serialport::{SerialPort, SerialPortInfo};
use tracing::debug;

use crate::channel::Channel;

/// Default modem baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default read poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Serial port settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Port path, e.g. `/dev/ttyACM0` or `COM3`
    pub path: String,
    /// Baud rate
    pub baud_rate: u32,
    /// How long a single read blocks before returning empty
    pub poll_interval: Duration,
}

impl SerialConfig {
    /// Settings for `path` with default baud rate and poll interval
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the baud rate
    pub const fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the read poll interval
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// [`Channel`] over a serial port, opened on start and closed on stop
pub struct SerialChannel {
    config: SerialConfig,
    port: Option<Mutex<Box<dyn SerialPort>>>,
}

impl fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialChannel")
            .field("config", &self.config)
            .field("is_open", &self.port.is_some())
            .finish()
    }
}

impl SerialChannel {
    /// Create a channel; the port is not touched until [`Channel::start`]
    pub const fn new(config: SerialConfig) -> Self {
        Self { config, port: None }
    }

    /// Get the port settings
    pub const fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn port(&self) -> io::Result<&Mutex<Box<dyn SerialPort>>> {
        self.port
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port not open"))
    }
}

impl Channel for SerialChannel {
    fn start(&mut self) -> io::Result<()> {
        if self.port.is_some() {
            return Ok(());
        }

        let port = serialport::new(&self.config.path, self.config.baud_rate)
            .timeout(self.config.poll_interval)
            .open()?;
        debug!(path = %self.config.path, baud = self.config.baud_rate, "Opened serial port");

        self.port = Some(Mutex::new(port));
        Ok(())
    }

    fn stop(&mut self) {
        if self.port.take().is_some() {
            debug!(path = %self.config.path, "Closed serial port");
        }
    }

    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut port = self.port()?.lock();
        let written = port.write(data)?;
        port.flush()?;
        Ok(written)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port()?.lock().read(buf)
    }
}

/// Serial ports present on this machine
pub fn available_ports() -> io::Result<Vec<SerialPortInfo>> {
    Ok(serialport::available_ports()?)
}
