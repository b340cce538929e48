use crate::error::DiscoveryError;
use crate::models::{Candidate, HealthPayload, ProbeResult};
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Create the HTTP client shared by all probes in a run
pub fn create_http_client(timeout: Duration) -> Result<Client, DiscoveryError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent("apiscout/0.1.0")
        // Connection timeout separate from the request timeout
        .connect_timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(2)
        .build()
        .map_err(|e| DiscoveryError::ClientError(format!("Failed to create HTTP client: {}", e)))?;

    Ok(client)
}

/// Issue one bounded reachability check against a candidate
///
/// Reachable means a 2xx response from the health endpoint whose body parses
/// as a JSON object (the conventional payload is `{"ok": ...}`; the value is
/// not interpreted). Connection errors, bad statuses, unparseable bodies,
/// timeouts and cancellation all collapse to unreachable; no distinction
/// leaks to the caller beyond the boolean and the observed latency.
pub async fn probe(
    client: &Client,
    candidate: Candidate,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ProbeResult {
    let health_url = candidate.health_url();
    let started = Instant::now();

    let request = async {
        let response = client.get(&health_url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body = response.bytes().await.ok()?;
        serde_json::from_slice::<HealthPayload>(&body).ok()?;
        Some(())
    };

    let outcome = tokio::select! {
        _ = cancel.cancelled() => None,
        result = tokio::time::timeout(timeout, request) => result.ok().flatten(),
    };

    match outcome {
        Some(()) => {
            let latency = started.elapsed();
            tracing::debug!("Candidate {} reachable in {:?}", candidate.base_url, latency);
            ProbeResult::reachable(candidate, latency)
        }
        None => {
            tracing::debug!("Candidate {} unreachable", candidate.base_url);
            ProbeResult::unreachable(candidate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateOrigin;

    #[test]
    fn client_builds_with_short_timeout() {
        assert!(create_http_client(Duration::from_millis(500)).is_ok());
    }

    #[tokio::test]
    async fn refused_connection_reports_unreachable() {
        let client = create_http_client(Duration::from_millis(500)).unwrap();
        let candidate = Candidate::new("http://127.0.0.1:1", CandidateOrigin::Loopback);

        let result = probe(
            &client,
            candidate.clone(),
            Duration::from_millis(500),
            &CancellationToken::new(),
        )
        .await;

        assert!(!result.reachable);
        assert!(result.latency.is_none());
        assert_eq!(result.candidate, candidate);
    }

    #[tokio::test]
    async fn cancelled_probe_reports_unreachable_immediately() {
        let client = create_http_client(Duration::from_secs(5)).unwrap();
        let candidate = Candidate::new("http://203.0.113.1:9", CandidateOrigin::Subnet);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let started = Instant::now();
        let result = probe(&client, candidate, Duration::from_secs(5), &cancel).await;

        assert!(!result.reachable);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
