// src/preflight.rs
// =============================================================================
// One-shot reachability check of the target, done before the scan starts.
//
// A HEAD request with a short timeout. If the server does not answer, or
// answers with a 4xx/5xx, there is no point in sending thousands of probes.
// =============================================================================

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::ScanError;
use crate::probe::USER_AGENT;

const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn check_reachable(url: &str) -> Result<(), ScanError> {
    let client = Client::builder()
        .timeout(PREFLIGHT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;

    let response = client.head(url).send().await.map_err(|e| {
        let reason = if e.is_timeout() {
            format!("connection to '{}' timed out", url)
        } else if e.is_connect() {
            format!(
                "failed to connect to '{}'; the server may be down or the URL is incorrect",
                url
            )
        } else {
            format!("unable to reach '{}': {}", url, e)
        };
        ScanError::Unreachable(reason)
    })?;

    let status = response.status();
    debug!(url, status = status.as_u16(), "preflight answered");

    if status.is_client_error() || status.is_server_error() {
        return Err(ScanError::Unreachable(format!(
            "'{}' returned a non-successful status code ({})",
            url,
            status.as_u16()
        )));
    }

    Ok(())
}
