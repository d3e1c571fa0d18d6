// src/probe/mod.rs
// =============================================================================
// Everything needed to probe a single candidate URL.
//
// Submodules:
// - policy: decides whether a status code is a hit
// - http: sends the request, retries transient failures, classifies
// =============================================================================

mod http;
mod policy;

pub use http::{FailureKind, Hit, ProbeOutcome, Prober, RetryPolicy, USER_AGENT};
pub use policy::ScanPolicy;
