// src/wordlist.rs
// =============================================================================
// Loads the wordlist file: one word per line.
//
// - Both LF and CRLF line endings are accepted
// - Blank lines are skipped (they would only re-probe the base URL)
// - Order is preserved, duplicates are kept
// =============================================================================

use std::fs;
use std::path::Path;

use crate::error::ScanError;

pub fn load(path: &Path) -> Result<Vec<String>, ScanError> {
    let content = fs::read_to_string(path).map_err(|source| ScanError::Wordlist {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse(&content))
}

fn parse(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
