//! Error types specific to card transport

use thiserror::Error;

/// Transport error type
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection error
    #[error("Failed to connect to device")]
    Connection,

    /// Transport used before it was opened
    #[error("Transport is not open")]
    NotConnected,

    /// Transmission error
    #[error("Failed to transmit data")]
    Transmission,

    /// Receive error
    #[error("Failed to receive data")]
    Receive,

    /// The device rejected the command
    #[error("Device rejected the command")]
    Device,

    /// The device rejected the command with an extended error code
    #[error("Device error code: {0}")]
    DeviceCode(u16),

    /// Response could not be parsed
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Buffer too small
    #[error("Buffer too small")]
    BufferTooSmall,

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Cancelled operation
    #[error("Operation cancelled")]
    Cancelled,
}

impl TransportError {
    /// Create a new malformed response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed(message.into())
    }

    /// Whether the error was raised by the link rather than the device
    pub const fn is_link_error(&self) -> bool {
        matches!(
            self,
            Self::Connection
                | Self::NotConnected
                | Self::Transmission
                | Self::Receive
                | Self::Timeout
                | Self::Cancelled
        )
    }

    /// Get the device error code if this is an extended device error
    pub const fn device_code(&self) -> Option<u16> {
        match self {
            Self::DeviceCode(code) => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_errors() {
        assert!(TransportError::Timeout.is_link_error());
        assert!(TransportError::Receive.is_link_error());
        assert!(!TransportError::Device.is_link_error());
        assert!(!TransportError::malformed("bad length").is_link_error());
    }

    #[test]
    fn test_device_code() {
        assert_eq!(TransportError::DeviceCode(10).device_code(), Some(10));
        assert_eq!(TransportError::Device.device_code(), None);
        assert_eq!(
            TransportError::DeviceCode(3).to_string(),
            "Device error code: 3"
        );
    }
}
