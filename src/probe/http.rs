// src/probe/http.rs
// =============================================================================
// This module sends the actual HTTP requests for candidate URLs.
//
// Key functionality:
// - One GET per candidate, with a fixed timeout and a fixed User-Agent
// - Bounded retry with exponential backoff on transient failures
//   (429 / 500 / 502 / 503 / 504, connection errors, timeouts)
// - Classifies the final response against the ScanPolicy
// - Turns reqwest errors into a small FailureKind enum
//
// Retry budget, backoff and retryable statuses all live in RetryPolicy.
// =============================================================================

use std::collections::BTreeSet;
use std::error::Error as _;
use std::fmt;
use std::time::Duration;

use reqwest::{redirect, Client, Response};
use serde::Serialize;
use tokio::time::sleep;
use tracing::debug;

use super::policy::ScanPolicy;
use crate::error::ScanError;
use crate::scan::CancellationFlag;

/// User-Agent sent with every probe
pub const USER_AGENT: &str = "dirprobe";

/// A discovered URL together with what the server answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub url: String,
    pub status: u16,
    /// Body length in bytes
    pub size: u64,
}

/// Why a candidate could not be probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Could not connect (refused, reset, DNS, ...)
    Connect(String),
    /// Request did not finish within the configured timeout
    Timeout,
    /// Anything else, including an exhausted retry budget
    Request(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Connect(detail) => write!(f, "connection failed: {}", detail),
            FailureKind::Timeout => write!(f, "timed out"),
            FailureKind::Request(detail) => write!(f, "request failed: {}", detail),
        }
    }
}

/// Result of probing one candidate URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Hit(Hit),
    Miss { status: u16 },
    Failure(FailureKind),
}

/// How hard we try before giving up on a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every following retry
    pub backoff_base: Duration,
    pub retryable_statuses: BTreeSet<u16>,
}

impl RetryPolicy {
    /// Delay to wait before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(retry))
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            retryable_statuses: [429, 500, 502, 503, 504].into_iter().collect(),
        }
    }
}

// The request executor: one client, one retry policy, one scan policy.
// A single Prober is shared by every worker of a scan.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    retry: RetryPolicy,
    policy: ScanPolicy,
}

impl Prober {
    pub fn new(timeout: Duration, retry: RetryPolicy, policy: ScanPolicy) -> Result<Self, ScanError> {
        // Redirects are not followed: a 301/302 is an answer we want to see
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            retry,
            policy,
        })
    }

    /// Probes one candidate URL and classifies the answer.
    ///
    /// The body is only downloaded for hits, since only hits report a size.
    /// Once `cancel` is raised no further retry is attempted; the last
    /// answer (or error) is classified as is.
    pub async fn probe(&self, url: &str, cancel: &CancellationFlag) -> ProbeOutcome {
        let response = match self.send_with_retry(url, cancel).await {
            Ok(response) => response,
            Err(kind) => return ProbeOutcome::Failure(kind),
        };

        let status = response.status().as_u16();
        if !self.policy.is_hit(status) {
            return ProbeOutcome::Miss { status };
        }

        match response.bytes().await {
            Ok(body) => ProbeOutcome::Hit(Hit {
                url: url.to_string(),
                status,
                size: body.len() as u64,
            }),
            Err(e) => ProbeOutcome::Failure(categorize_error(&e)),
        }
    }

    // Sends the GET, retrying transient failures until the budget runs out.
    //
    // Attempts = 1 + max_retries. A retryable status that survives the whole
    // budget becomes a Request failure; the caller never sees that response.
    // The cancellation flag is checked before and after every backoff sleep.
    async fn send_with_retry(
        &self,
        url: &str,
        cancel: &CancellationFlag,
    ) -> Result<Response, FailureKind> {
        let mut retries = 0;

        loop {
            let result = self.client.get(url).send().await;

            let transient = match &result {
                Ok(response) => self.retry.is_retryable_status(response.status().as_u16()),
                Err(e) => is_transient(e),
            };

            if !transient || cancel.is_cancelled() {
                return result.map_err(|e| categorize_error(&e));
            }

            if retries >= self.retry.max_retries {
                return Err(match result {
                    Ok(response) => FailureKind::Request(format!(
                        "gave up after {} attempts (last status {})",
                        retries + 1,
                        response.status().as_u16()
                    )),
                    Err(e) => categorize_error(&e),
                });
            }

            let delay = self.retry.backoff(retries);
            match &result {
                Ok(response) => {
                    debug!(url, status = response.status().as_u16(), retry = retries + 1, ?delay, "retrying")
                }
                Err(e) => debug!(url, error = %e, retry = retries + 1, ?delay, "retrying"),
            }

            sleep(delay).await;
            if cancel.is_cancelled() {
                debug!(url, attempts = retries + 1, "scan cancelled, not retrying");
                return result.map_err(|e| categorize_error(&e));
            }
            retries += 1;
        }
    }
}

// Timeouts and refused/reset connections are worth another try;
// DNS failures and malformed URLs are not.
fn is_transient(error: &reqwest::Error) -> bool {
    if error.is_timeout() {
        return true;
    }
    error.is_connect() && !error_chain(error).to_lowercase().contains("dns")
}

// Categorizes reqwest errors into the three failure kinds
fn categorize_error(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_connect() {
        FailureKind::Connect(error_chain(error))
    } else {
        FailureKind::Request(error_chain(error))
    }
}

// reqwest's Display only shows the outermost layer ("error sending request");
// the useful part (refused, dns error, ...) sits further down the chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
