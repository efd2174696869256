//! `AT+CSIM` command frames and the lines a modem answers with

use crate::codec::{self, HexMode};
use crate::error::AtError;

/// Prefix of the line carrying the APDU response
pub const CSIM_PREFIX: &[u8] = b"+CSIM: ";
/// Final result code of a failed command
pub const ERROR_LINE: &[u8] = b"ERROR\r\n";
/// Final result code of a successful command
pub const OK_LINE: &[u8] = b"OK\r\n";
/// Prefix of an extended error result
pub const CME_ERROR_PREFIX: &[u8] = b"+CME ERROR: ";

/// Build `AT+CSIM=<len>,"<HEX>"\r\n` for `apdu`
///
/// `<len>` counts hex characters, i.e. twice the APDU length.
pub fn build_command(apdu: &[u8]) -> String {
    let payload = codec::encode(apdu);
    format!("AT+CSIM={},\"{}\"\r\n", payload.len(), payload)
}

/// Classification of one response line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `+CSIM: ...`
    Csim,
    /// Exactly `OK\r\n`
    Ok,
    /// Exactly `ERROR\r\n`
    Error,
    /// `+CME ERROR: <text>`, text without the line terminator
    CmeError(&'a [u8]),
    /// Echo, blank lines, unsolicited result codes
    Other,
}

impl<'a> Line<'a> {
    /// Classify a line including its terminator
    pub fn classify(line: &'a [u8]) -> Self {
        if line == OK_LINE {
            Self::Ok
        } else if line == ERROR_LINE {
            Self::Error
        } else if line.starts_with(CSIM_PREFIX) {
            Self::Csim
        } else if let Some(text) = line.strip_prefix(CME_ERROR_PREFIX) {
            Self::CmeError(text.trim_ascii_end())
        } else {
            Self::Other
        }
    }
}

/// The payload part of a `+CSIM:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsimReply<'a> {
    hex_len: usize,
    payload: &'a [u8],
}

impl<'a> CsimReply<'a> {
    /// Parse `+CSIM: <len>,<sep><HEX>...`
    ///
    /// The payload starts at the first hex digit after the comma, whatever
    /// separators precede it, and spans exactly `<len>` characters.
    pub fn parse(line: &'a [u8]) -> Result<Self, AtError> {
        let body = line
            .strip_prefix(CSIM_PREFIX)
            .ok_or(AtError::MalformedReply("missing +CSIM: prefix"))?;

        let comma = body
            .iter()
            .position(|&b| b == b',')
            .ok_or(AtError::MalformedReply("missing ',' after length"))?;

        let digits = &body[..comma];
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(AtError::MalformedReply("length is not a decimal number"));
        }
        let hex_len: usize = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(AtError::MalformedReply("length out of range"))?;
        if hex_len % 2 != 0 {
            return Err(hex::FromHexError::OddLength.into());
        }

        if hex_len == 0 {
            return Ok(Self {
                hex_len,
                payload: &[],
            });
        }

        let rest = &body[comma + 1..];
        let start = rest
            .iter()
            .position(|&b| codec::is_hex_digit(b))
            .ok_or(AtError::MalformedReply("no hex payload after ','"))?;
        let payload = start
            .checked_add(hex_len)
            .and_then(|end| rest.get(start..end))
            .ok_or(AtError::MalformedReply("payload shorter than declared length"))?;

        Ok(Self { hex_len, payload })
    }

    /// Declared payload length in hex characters
    pub const fn hex_len(&self) -> usize {
        self.hex_len
    }

    /// Raw hex characters of the payload
    pub const fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Decode the payload into APDU response bytes
    pub fn decode(&self, mode: HexMode) -> Result<Vec<u8>, AtError> {
        Ok(codec::decode(self.payload, mode)?)
    }
}
