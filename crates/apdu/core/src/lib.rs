//! Core traits and types for APDU (Application Protocol Data Unit) exchanges
//!
//! This crate holds the seam every transport plugs into. Applet-level code is
//! written against [`CardTransport`] and never needs to know whether APDUs
//! travel over a modem's AT interface or some other link.
//!
//! ## Overview
//!
//! - [`CardTransport`]: binary APDU in, binary APDU response out
//! - [`TransportError`]: the failure kinds every transport reports
//!
//! Status word interpretation deliberately lives above this crate.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::Bytes;

pub mod transport;

pub use transport::{CardTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes,
        transport::{CardTransport, TransportError},
    };
}
