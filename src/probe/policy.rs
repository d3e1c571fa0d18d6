// src/probe/policy.rs
// =============================================================================
// This module decides whether an HTTP status code counts as a "hit".
//
// A scan policy has two sets of status codes:
// - accepted: codes we consider interesting (200, 301, 403, ...)
// - excluded: codes we never report (404 by default)
//
// The excluded set always wins: a code that appears in both sets is a miss.
//
// Rust concepts:
// - BTreeSet: An ordered set, so the banner prints codes in a stable order
// - Pure functions: is_hit() has no side effects and never fails
// =============================================================================

use std::collections::BTreeSet;

use crate::error::ScanError;

/// Status codes accepted when the user does not pass --status-codes
pub const DEFAULT_ACCEPTED: &[u16] = &[200, 204, 301, 302, 307, 403];

/// Status codes excluded when the user does not pass --negative-status
pub const DEFAULT_EXCLUDED: &[u16] = &[404];

// Accept / reject policy applied to every response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPolicy {
    accepted: BTreeSet<u16>,
    excluded: BTreeSet<u16>,
}

impl ScanPolicy {
    /// Builds a policy from explicit sets, rejecting codes that are not
    /// valid HTTP status codes and an empty accepted set.
    pub fn new(
        accepted: impl IntoIterator<Item = u16>,
        excluded: impl IntoIterator<Item = u16>,
    ) -> Result<Self, ScanError> {
        let accepted: BTreeSet<u16> = accepted.into_iter().collect();
        let excluded: BTreeSet<u16> = excluded.into_iter().collect();

        if let Some(code) = accepted
            .iter()
            .chain(excluded.iter())
            .find(|code| !(100..=599).contains(*code))
        {
            return Err(ScanError::InvalidPolicy(format!(
                "{} is not a valid HTTP status code",
                code
            )));
        }

        if accepted.is_empty() {
            return Err(ScanError::InvalidPolicy(
                "no status codes left to accept".to_string(),
            ));
        }

        Ok(Self { accepted, excluded })
    }

    /// Resolves the effective policy from what the user passed on the
    /// command line, filling in defaults the same way for every run.
    ///
    /// - accepted given: use it as is, excluded falls back to [404]
    /// - accepted missing: default accepted list minus the excluded codes
    pub fn resolve(
        accepted: Option<Vec<u16>>,
        excluded: Option<Vec<u16>>,
    ) -> Result<Self, ScanError> {
        let excluded = excluded.unwrap_or_else(|| DEFAULT_EXCLUDED.to_vec());

        let accepted = match accepted {
            Some(codes) => codes,
            None => DEFAULT_ACCEPTED
                .iter()
                .copied()
                .filter(|code| !excluded.contains(code))
                .collect(),
        };

        Self::new(accepted, excluded)
    }

    /// Returns true when `status` is accepted and not excluded
    pub fn is_hit(&self, status: u16) -> bool {
        self.accepted.contains(&status) && !self.excluded.contains(&status)
    }

    pub fn accepted(&self) -> impl Iterator<Item = u16> + '_ {
        self.accepted.iter().copied()
    }

    pub fn excluded(&self) -> impl Iterator<Item = u16> + '_ {
        self.excluded.iter().copied()
    }
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            accepted: DEFAULT_ACCEPTED.iter().copied().collect(),
            excluded: DEFAULT_EXCLUDED.iter().copied().collect(),
        }
    }
}
