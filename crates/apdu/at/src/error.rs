//! Error types for the AT transport

use std::io;

use apdu_core::TransportError;

/// AT-specific errors
#[derive(Debug, thiserror::Error)]
pub enum AtError {
    /// The channel refused to start
    #[error("Failed to open channel: {0}")]
    ChannelOpen(#[source] io::Error),

    /// Writing the command frame failed
    #[error("Failed to send command frame: {0}")]
    Send(#[source] io::Error),

    /// The channel accepted only part of the command frame
    #[error("Short write: sent {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes the channel reported as written
        written: usize,
        /// Length of the frame
        expected: usize,
    },

    /// Reading from the channel failed
    #[error("Failed to receive from channel: {0}")]
    Recv(#[source] io::Error),

    /// The modem answered `ERROR`
    #[error("Modem replied ERROR")]
    Protocol,

    /// The modem answered `+CME ERROR: <text>`
    #[error("Modem replied +CME ERROR: {0}")]
    DeviceError(String),

    /// A response line did not fit the configured maximum
    #[error("Response line exceeds {limit} bytes")]
    LineTooLong {
        /// Configured maximum line length
        limit: usize,
    },

    /// The `+CSIM:` record could not be parsed
    #[error("Malformed +CSIM reply: {0}")]
    MalformedReply(&'static str),

    /// The hex payload could not be decoded
    #[error("Invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// No complete exchange before the deadline
    #[error("Timed out waiting for modem")]
    Timeout,

    /// The exchange was cancelled through its handle
    #[error("Exchange cancelled")]
    Cancelled,

    /// The transport has not been opened
    #[error("Transport is not open")]
    NotOpen,
}

impl AtError {
    /// Numeric `+CME ERROR` code, when the modem reported one
    pub fn device_code(&self) -> Option<u16> {
        match self {
            Self::DeviceError(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<AtError> for TransportError {
    fn from(err: AtError) -> Self {
        match err {
            AtError::ChannelOpen(_) => Self::Connection,
            AtError::NotOpen => Self::NotConnected,
            AtError::Send(_) | AtError::ShortWrite { .. } => Self::Transmission,
            AtError::Recv(_) => Self::Receive,
            AtError::Protocol => Self::Device,
            AtError::DeviceError(_) => err.device_code().map_or(Self::Device, Self::DeviceCode),
            AtError::LineTooLong { .. } => Self::BufferTooSmall,
            AtError::MalformedReply(_) | AtError::InvalidHex(_) => {
                Self::malformed(err.to_string())
            }
            AtError::Timeout => Self::Timeout,
            AtError::Cancelled => Self::Cancelled,
        }
    }
}
