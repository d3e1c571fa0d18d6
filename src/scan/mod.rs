// src/scan/mod.rs
// =============================================================================
// The concurrent scanning engine.
//
// Submodules:
// - cancel: shared stop flag
// - store: deduplicating, ordered result collection
// - partition: wordlist chunking and candidate URL expansion
// - coordinator: worker pool, rate limiting, scan lifecycle
// =============================================================================

mod cancel;
mod coordinator;
mod partition;
mod store;

pub use cancel::CancellationFlag;
pub use coordinator::{Coordinator, ScanObserver, ScanReport, ScanStatus};
