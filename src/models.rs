use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where a candidate address came from, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateOrigin {
    /// Explicit override from configuration, short-circuits everything else
    Override,
    /// Last known-good address, re-validated before anything new is tried
    Cached,
    /// Platform loopback address (emulator gateway, localhost)
    Loopback,
    /// Swept private-subnet host address
    Subnet,
    /// Hostname-based guess
    Hostname,
    /// Hard-coded last resort
    Fallback,
}

/// One endpoint address considered during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Base URL including scheme, address, port and base path
    pub base_url: String,
    pub origin: CandidateOrigin,
}

impl Candidate {
    pub fn new(base_url: impl Into<String>, origin: CandidateOrigin) -> Self {
        Self {
            base_url: base_url.into(),
            origin,
        }
    }

    /// URL of the health endpoint probed for this candidate
    pub fn health_url(&self) -> String {
        if self.base_url.ends_with('/') {
            format!("{}health", self.base_url)
        } else {
            format!("{}/health", self.base_url)
        }
    }
}

/// Outcome of a single reachability check against one candidate
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub candidate: Candidate,
    pub reachable: bool,
    /// Round-trip time of the health request, present only when reachable
    pub latency: Option<Duration>,
    pub observed_at: DateTime<Utc>,
}

impl ProbeResult {
    pub fn reachable(candidate: Candidate, latency: Duration) -> Self {
        Self {
            candidate,
            reachable: true,
            latency: Some(latency),
            observed_at: Utc::now(),
        }
    }

    pub fn unreachable(candidate: Candidate) -> Self {
        Self {
            candidate,
            reachable: false,
            latency: None,
            observed_at: Utc::now(),
        }
    }
}

/// How the current resolution was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Override,
    Cache,
    Probe,
    Fallback,
}

/// The resolved backend base address, the unit stored in the resolution cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEndpoint {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "resolvedAt")]
    pub resolved_at: DateTime<Utc>,
    pub source: ResolutionSource,
}

impl ResolvedEndpoint {
    pub fn new(base_url: impl Into<String>, source: ResolutionSource) -> Self {
        Self {
            base_url: base_url.into(),
            resolved_at: Utc::now(),
            source,
        }
    }
}

/// Body returned by the well-known health endpoint
///
/// Only used by reachability checks and the test stubs; any 2xx response
/// carrying a JSON object counts as reachable regardless of the `ok` value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPayload {
    pub ok: Option<serde_json::Value>,
}
