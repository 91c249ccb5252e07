// crates/container-harness/src/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Readiness probes for containerized HTTP services.
// Purpose: Ensure services are ready without arbitrary sleeps.
// Dependencies: reqwest, tokio
// ============================================================================

//! ## Overview
//! Some services print their startup banner before the HTTP API accepts
//! requests. [`wait_for_http_ok`] polls an endpoint until it answers 2xx so
//! fixtures hand out clients only once the API is serving.

use std::time::Duration;
use std::time::Instant;

use reqwest::Client;
use tokio::time::sleep;

use crate::error::HarnessError;

/// Delay between readiness attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Polls `url` with GET until it answers 2xx or `timeout` expires.
///
/// # Errors
///
/// Returns [`HarnessError::Readiness`] carrying the attempt count and the last
/// observed failure once the timeout elapses.
pub async fn wait_for_http_ok(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<(), HarnessError> {
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let failure = match client.get(url).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) => format!("status {}", response.status()),
            Err(err) => err.to_string(),
        };
        if start.elapsed() > timeout {
            return Err(HarnessError::Readiness(format!(
                "{url} not ready after {attempts} attempts: {failure}"
            )));
        }
        sleep(POLL_INTERVAL).await;
    }
}
