//! AT+CSIM transport implementation for APDU operations
//!
//! This crate provides an implementation of the `CardTransport` trait from
//! `apdu-core` that reaches a SIM-resident secure element through a cellular
//! modem. Each APDU is hex encoded into an `AT+CSIM` command, written to the
//! modem, and the `+CSIM:` reply is decoded back into response bytes.
//!
//! # Features
//!
//! - `serial` (default): [`SerialChannel`] over the `serialport` crate
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use apdu_transport_at::{AtConfig, AtTransport, SerialChannel, SerialConfig};
//!
//! let channel = SerialChannel::new(SerialConfig::new("/dev/ttyACM0"));
//! let mut transport = AtTransport::with_config(channel, AtConfig::default());
//! transport.open()?;
//!
//! // SELECT the master file
//! let response = transport.exchange(&[0x00, 0xA4, 0x00, 0x04, 0x02, 0x3F, 0x00])?;
//! println!("Response: {}", hex::encode_upper(&response));
//!
//! transport.close();
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
pub mod channel;
pub mod codec;
mod config;
mod error;
pub mod frame;
mod line;
#[cfg(feature = "serial")]
mod serial;
mod transport;

// Public exports
pub use cancel::CancelHandle;
pub use channel::{Channel, IoChannel};
pub use codec::HexMode;
pub use config::{AtConfig, DEFAULT_MAX_LINE_LEN, DEFAULT_RESYNC_WINDOW, DEFAULT_TIMEOUT};
pub use error::AtError;
pub use line::LineReader;
#[cfg(feature = "serial")]
pub use serial::{
    DEFAULT_BAUD_RATE, DEFAULT_POLL_INTERVAL, SerialChannel, SerialConfig, available_ports,
};
pub use transport::{AtTransport, SessionState};

// Re-export some serialport types for convenience
#[cfg(feature = "serial")]
pub use serialport::{SerialPortInfo, SerialPortType};
