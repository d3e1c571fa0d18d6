// src/report.rs
// =============================================================================
// Everything the user sees or keeps after a scan:
// - the banner printed before the scan
// - live hit lines (stdout) and warnings (stderr) while it runs
// - the final output file and the optional JSON dump
// =============================================================================

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::probe::{FailureKind, Hit, USER_AGENT};
use crate::scan::ScanObserver;

const RULE_WIDTH: usize = 63;

/// Prints hits and failures as they happen
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl ScanObserver for ConsoleObserver {
    fn on_hit(&self, hit: &Hit) {
        println!("{}", format_hit(hit));
    }

    fn on_failure(&self, url: &str, failure: &FailureKind) {
        eprintln!("{}", format_failure(url, failure));
    }
}

fn format_hit(hit: &Hit) -> String {
    format!("{} [Status code: {}, Size: {}]", hit.url, hit.status, hit.size)
}

fn format_failure(url: &str, failure: &FailureKind) -> String {
    match failure {
        FailureKind::Connect(_) => format!("Warning: Failed to connect to '{}'.", url),
        FailureKind::Timeout => format!("Warning: Connection to '{}' timed out.", url),
        FailureKind::Request(detail) => format!("Warning: Request to '{}' failed. {}", url, detail),
    }
}

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn print_banner(config: &ScanConfig, wordlist: &Path) {
    println!("{}", rule());
    println!("[+] Url:                     {}", config.base_url);
    println!("[+] Threads:                 {}", config.threads);
    println!("[+] Delay:                   {}s", config.delay.as_secs_f64());
    println!("[+] Wordlist:                {}", wordlist.display());
    println!("[+] Status codes:            {}", join_codes(config.policy.accepted()));
    println!("[+] Negative Status codes:   {}", join_codes(config.policy.excluded()));
    if !config.extensions.is_empty() {
        println!("[+] Extensions:              {}", config.extensions.join(", "));
    }
    println!("[+] User Agent:              {}", USER_AGENT);
    println!("[+] Timeout:                 {}s", config.timeout.as_secs_f64());
    if let Some(output) = &config.output {
        println!("[+] Output file:             {}", output.display());
    }
    println!("{}", rule());
}

fn join_codes(codes: impl Iterator<Item = u16>) -> String {
    codes.map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
}

/// Rewrites `path` with every discovered URL, one per line, in discovery order
pub fn write_results(path: &Path, hits: &[Hit]) -> Result<(), ScanError> {
    let to_error = |source: std::io::Error| ScanError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    for hit in hits {
        writeln!(writer, "{}", hit.url).map_err(to_error)?;
    }
    writer.flush().map_err(to_error)
}

pub fn to_json(hits: &[Hit]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(hits)
}
