// src/error.rs
// =============================================================================
// Fatal errors: anything here stops the run before a single worker starts.
//
// Per-candidate problems (timeouts, refused connections, 5xx storms) are NOT
// errors in this sense. They are reported as FailureKind values and the scan
// keeps going.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid status code policy: {0}")]
    InvalidPolicy(String),

    #[error("cannot read wordlist '{}': {source}", path.display())]
    Wordlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("target unreachable: {0}")]
    Unreachable(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("cannot write output file '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
