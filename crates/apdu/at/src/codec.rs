//! Hex conversion between APDU bytes and their AT representation
//!
//! Encoding always produces uppercase digits, which is what modems expect
//! inside `AT+CSIM`. Decoding has two modes: the lenient one treats any
//! character outside `0-9A-Fa-f` as a zero nibble, which is how deployed
//! modem drivers have always behaved; the strict one rejects it.

use hex::FromHexError;

/// How non-hex characters inside a payload are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HexMode {
    /// Non-hex characters contribute zero bits
    #[default]
    Lenient,
    /// Non-hex characters fail the decode
    Strict,
}

/// Encode bytes as uppercase hex, two characters per byte
pub fn encode(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Whether `byte` is one of `0-9`, `A-F` or `a-f`
pub const fn is_hex_digit(byte: u8) -> bool {
    byte.is_ascii_hexdigit()
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

/// Decode hex pairs, mapping unknown characters to zero
///
/// # Errors
/// Returns [`FromHexError::OddLength`] if `hex` has an odd length.
pub fn decode_lenient(hex: &[u8]) -> Result<Vec<u8>, FromHexError> {
    if hex.len() % 2 != 0 {
        return Err(FromHexError::OddLength);
    }

    Ok(hex
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect())
}

/// Decode `hex` according to `mode`
pub fn decode(hex: &[u8], mode: HexMode) -> Result<Vec<u8>, FromHexError> {
    match mode {
        HexMode::Lenient => decode_lenient(hex),
        HexMode::Strict => hex::decode(hex),
    }
}
