//! Cooperative cancellation for scan and clean runs.

#[cfg(test)]
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Cancelled;

/// Shared stop flag threaded through every sizing and cleaning call.
///
/// Clones share the same flag. A run owns one token for its whole lifetime; a cancel
/// request only flips the flag and the run notices at its next checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    #[cfg(test)]
    trip_after: Option<Arc<AtomicUsize>>,
}

impl CancellationToken {
    /// Create a fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Checkpoint: `Err(Cancelled)` once the flag is set.
    pub fn check(&self) -> Result<(), Cancelled> {
        #[cfg(test)]
        self.count_checkpoint();

        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Token that lets `checks` checkpoints pass and cancels itself on the next one.
    #[cfg(test)]
    pub(crate) fn cancel_after(checks: usize) -> Self {
        Self {
            trip_after: Some(Arc::new(AtomicUsize::new(checks))),
            ..Self::default()
        }
    }

    #[cfg(test)]
    fn count_checkpoint(&self) {
        if let Some(remaining) = &self.trip_after {
            let spent = remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err();
            if spent {
                self.cancel();
            }
        }
    }
}
