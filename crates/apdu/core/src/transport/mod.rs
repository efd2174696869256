//! Transport traits for APDU communication with cards
//!
//! This module provides the abstraction every concrete link implements.

pub mod error;

use std::fmt;

use bytes::Bytes;
pub use error::TransportError;
use tracing::{debug, trace};

/// Trait for basic card transports
///
/// A transport is responsible for sending and receiving raw APDU bytes.
/// It has no knowledge of command structure, secure channels, or status words.
pub trait CardTransport: Send + Sync + fmt::Debug {
    /// Error type returned by the transport
    type Error: Into<TransportError> + fmt::Debug;

    /// Send raw APDU bytes to card and return response bytes
    ///
    /// Implementations override [`CardTransport::do_transmit_raw`]; this
    /// wrapper only adds tracing around it.
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Self::Error> {
        trace!(command = %hex::encode_upper(command), "Transmitting raw command");
        let result = self.do_transmit_raw(command);
        match &result {
            Ok(response) => {
                trace!(response = %hex::encode_upper(response), "Received raw response");
            }
            Err(e) => {
                debug!(error = ?e, "Transport error during transmission");
            }
        }
        result
    }

    /// Internal implementation of transmit_raw
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Self::Error>;

    /// Check if the transport is ready to exchange APDUs
    fn is_connected(&self) -> bool;

    /// Reset the transport connection
    fn reset(&mut self) -> Result<(), Self::Error>;
}

impl<T: CardTransport + ?Sized> CardTransport for &mut T {
    type Error = T::Error;

    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Self::Error> {
        (**self).transmit_raw(command)
    }

    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Self::Error> {
        (**self).do_transmit_raw(command)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        (**self).reset()
    }
}
