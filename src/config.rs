// src/config.rs
// =============================================================================
// The validated configuration handed to the scan coordinator.
//
// Everything that can be wrong with the user's input is caught here, before
// any worker starts. Once a ScanConfig exists, the scan only ever has to deal
// with per-request failures.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ScanError;
use crate::probe::{RetryPolicy, ScanPolicy};

pub const DEFAULT_THREADS: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DELAY_SECS: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Target URL without trailing slash
    pub base_url: String,
    /// Suffixes appended to every word; empty means "probe the bare word"
    pub extensions: Vec<String>,
    pub threads: usize,
    /// Per-worker pause after every request
    pub delay: Duration,
    pub timeout: Duration,
    pub policy: ScanPolicy,
    pub retry: RetryPolicy,
    /// File that receives discovered URLs, one per line
    pub output: Option<PathBuf>,
}

impl ScanConfig {
    /// Builds a config with defaults for everything but the target
    pub fn new(base_url: &str) -> Result<Self, ScanError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            extensions: Vec::new(),
            threads: DEFAULT_THREADS,
            delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            policy: ScanPolicy::default(),
            retry: RetryPolicy::default(),
            output: None,
        })
    }

    /// Checks the invariants the scan relies on
    pub fn validate(&self) -> Result<(), ScanError> {
        normalize_base_url(&self.base_url)?;

        if self.threads == 0 {
            return Err(ScanError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Converts a delay given in (possibly fractional) seconds
pub fn delay_from_secs(secs: f64) -> Result<Duration, ScanError> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        ScanError::InvalidConfig(format!(
            "delay must be a non-negative number of seconds, got {}",
            secs
        ))
    })
}

// Parses the URL to make sure it is http(s), then strips trailing slashes
// so candidates can be built as "{base}/{word}".
fn normalize_base_url(raw: &str) -> Result<String, ScanError> {
    let parsed = Url::parse(raw)
        .map_err(|e| ScanError::InvalidConfig(format!("invalid URL '{}': {}", raw, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ScanError::InvalidConfig(format!(
            "unsupported URL scheme '{}' (expected http or https)",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ScanError::InvalidConfig(format!("URL has no host: {}", raw)));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
