//! Configuration options for the AT transport

use std::time::Duration;

use crate::codec::HexMode;

/// Default bound on a single response line
///
/// Large enough for a 256 byte response plus status word in hex, the quotes
/// and the `+CSIM: ` prefix.
pub const DEFAULT_MAX_LINE_LEN: usize = 537;

/// Default deadline for one exchange
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default wait for the leftover reply of an aborted exchange
pub const DEFAULT_RESYNC_WINDOW: Duration = Duration::from_secs(1);

/// Configuration options for the AT transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtConfig {
    /// Deadline for a whole exchange; `None` waits forever
    pub timeout: Option<Duration>,

    /// Longest response line accepted
    pub max_line_len: usize,

    /// Handling of non-hex characters in response payloads
    pub hex_mode: HexMode,

    /// Fail on `+CME ERROR:` lines instead of skipping them
    pub cme_errors: bool,

    /// How long the next exchange waits for the rest of an abandoned reply
    /// before sending its own command
    pub resync_window: Duration,
}

impl Default for AtConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            hex_mode: HexMode::Lenient,
            cme_errors: true,
            resync_window: DEFAULT_RESYNC_WINDOW,
        }
    }
}

impl AtConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exchange deadline
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum response line length
    pub const fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Set the hex decoding mode
    pub const fn with_hex_mode(mut self, mode: HexMode) -> Self {
        self.hex_mode = mode;
        self
    }

    /// Set whether `+CME ERROR:` fails the exchange
    pub const fn with_cme_errors(mut self, cme_errors: bool) -> Self {
        self.cme_errors = cme_errors;
        self
    }

    /// Set the wait for a reply left behind by a timed out or cancelled exchange
    pub const fn with_resync_window(mut self, window: Duration) -> Self {
        self.resync_window = window;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = AtConfig::new()
            .with_timeout(None)
            .with_max_line_len(1024)
            .with_hex_mode(HexMode::Strict)
            .with_cme_errors(false)
            .with_resync_window(Duration::from_millis(100));

        assert_eq!(config.timeout, None);
        assert_eq!(config.max_line_len, 1024);
        assert_eq!(config.hex_mode, HexMode::Strict);
        assert!(!config.cme_errors);
        assert_eq!(config.resync_window, Duration::from_millis(100));
        assert_ne!(config, AtConfig::default());
    }
}
