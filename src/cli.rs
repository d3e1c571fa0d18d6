// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI is a plain struct, and clap generates the
// parsing, --help and --version output from the attributes.
//
// Only parsing happens here. Turning the raw values into a validated
// ScanConfig is done by Cli::to_config().
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    delay_from_secs, ScanConfig, DEFAULT_DELAY_SECS, DEFAULT_THREADS, DEFAULT_TIMEOUT_SECS,
};
use crate::error::ScanError;
use crate::probe::ScanPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "dirprobe",
    version,
    about = "Discover hidden or unlinked paths on a web server using a wordlist",
    long_about = "dirprobe requests <url>/<word>[<extension>] for every word of a wordlist \
                  and reports the paths whose status code is accepted by the status code policy."
)]
pub struct Cli {
    /// Target URL (e.g., https://example.com)
    #[arg(short, long)]
    pub url: String,

    /// Path to the wordlist file, one word per line
    #[arg(short, long)]
    pub wordlist: PathBuf,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// Comma-separated file extensions to append (e.g., .php,.txt)
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Delay between requests of one worker, in seconds
    #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
    pub delay: f64,

    /// Comma-separated valid status codes (default: 200,204,301,302,307,403)
    #[arg(short, long, value_delimiter = ',')]
    pub status_codes: Option<Vec<u16>>,

    /// Comma-separated status codes to filter out (default: 404)
    #[arg(short, long, value_delimiter = ',')]
    pub negative_status: Option<Vec<u16>>,

    /// File to save found URLs
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the final results as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the validated scan configuration from the parsed arguments
    pub fn to_config(&self) -> Result<ScanConfig, ScanError> {
        let mut config = ScanConfig::new(&self.url)?;

        config.threads = self.threads;
        config.extensions = self.extensions.clone();
        config.timeout = std::time::Duration::from_secs(self.timeout);
        config.delay = delay_from_secs(self.delay)?;
        config.policy = ScanPolicy::resolve(self.status_codes.clone(), self.negative_status.clone())?;
        config.output = self.output.clone();

        config.validate()?;
        Ok(config)
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. value_delimiter = ','
//    - "-x .php,.txt" becomes vec![".php", ".txt"]
//    - "-s 200,301" is parsed straight into Vec<u16>; a non-number is
//      rejected by clap before we ever see it
//
// 2. Option<Vec<u16>> vs Vec<u16>
//    - None means "flag not given", which is different from an empty list:
//      the status code defaults only apply when the flag is missing
// -----------------------------------------------------------------------------
