// src/scan/cancel.rs
// =============================================================================
// A shared stop flag for one scan.
//
// - Starts out false, can only ever go to true
// - Written with Release, read with Acquire
// - Workers poll it between candidates; an in-flight request is never
//   interrupted, it finishes (or times out) first
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Calling it more than once is harmless.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
