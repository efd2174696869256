//! Cross-thread cancellation of a blocked exchange

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle that aborts the exchange currently blocked on the modem
///
/// Clones share one flag. The request is consumed by the first line read that
/// observes it. Each exchange clears the flag when it starts, so a request made
/// while no exchange is running has no effect.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    requested: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create a handle with no pending request
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Whether a request is pending
    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Consume a pending request
    pub(crate) fn take(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }
}
