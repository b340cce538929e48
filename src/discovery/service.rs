use crate::config::{validate_base_url, DiscoveryConfig};
use crate::error::DiscoveryError;
use crate::models::{Candidate, ProbeResult, ResolutionSource, ResolvedEndpoint};
use crate::persist;
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use std::time::Instant;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

use super::{cache::ResolutionCache, candidates, fallback, probe};

/// Backend endpoint discovery service
///
/// One instance owns its resolution cache and run state; inject it into
/// callers instead of going through a global. `discover()` is safe to call
/// from any number of tasks concurrently; at most one probe run is in flight
/// at a time and late callers attach to its result.
pub struct DiscoveryService {
    config: parking_lot::Mutex<DiscoveryConfig>,
    client: Client,
    cache: ResolutionCache,
    /// Serializes discovery runs; held across the whole probing sequence
    run_lock: AsyncMutex<()>,
}

impl DiscoveryService {
    /// Build a service from validated configuration
    ///
    /// Fails fast on a malformed override address or an unbuildable HTTP
    /// client; these are setup mistakes, not network conditions.
    pub fn new(mut config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        if let Some(url) = &config.override_url {
            config.override_url = Some(validate_base_url(url)?);
        }
        if let Some(url) = &config.fallback_url {
            config.fallback_url = Some(validate_base_url(url)?);
        }

        let client = probe::create_http_client(config.probe_timeout)?;
        let cache = ResolutionCache::new(config.probe_ttl, config.fallback_ttl);

        // Cold start: a persisted address from a previous run is only a hint.
        // It is seeded as already expired so it becomes the first probe
        // candidate instead of being trusted outright.
        if let Some(path) = &config.cache_file {
            if let Some(previous) = persist::load(path) {
                tracing::info!(
                    "Seeding discovery with persisted address {} (will re-validate)",
                    previous.base_url
                );
                cache.seed(previous.base_url);
            }
        }

        Ok(Self {
            config: parking_lot::Mutex::new(config),
            client,
            cache,
            run_lock: AsyncMutex::new(()),
        })
    }

    /// Resolve the backend base address, from cache or by running discovery
    pub async fn base_url(&self) -> String {
        self.discover().await.base_url
    }

    /// Run discovery if the cache has no fresh resolution
    ///
    /// Never fails: exhaustion and timeout both resolve to the fallback
    /// address, and ordinary request-level error handling downstream deals
    /// with a fallback that turns out unreachable too.
    pub async fn discover(&self) -> ResolvedEndpoint {
        // Fast path
        if let Some(endpoint) = self.cache.get() {
            return endpoint;
        }

        // A second caller arriving mid-run parks here, then picks up the
        // finished run's result from the cache instead of probing again
        let _run = self.run_lock.lock().await;
        if let Some(endpoint) = self.cache.get() {
            return endpoint;
        }

        let config = self.config.lock().clone();

        // Total confidence, zero probes
        if let Some(url) = &config.override_url {
            let endpoint = ResolvedEndpoint::new(url.clone(), ResolutionSource::Override);
            self.remember(&config, endpoint.clone());
            return endpoint;
        }

        let last_known = self.cache.last_known();
        let candidates = candidates::generate(&config, last_known.as_deref());
        tracing::info!(
            "Starting discovery run over {} candidates (batch size {})",
            candidates.len(),
            config.batch_size
        );
        let started = Instant::now();

        let winner = tokio::time::timeout(
            config.overall_timeout,
            probe_batches(&self.client, &config, candidates),
        )
        .await
        .ok()
        .flatten();

        let endpoint = match winner {
            Some(result) => {
                tracing::info!(
                    "Resolved backend at {} in {:?} (probe latency {:?}, origin {:?})",
                    result.candidate.base_url,
                    started.elapsed(),
                    result.latency,
                    result.candidate.origin
                );
                ResolvedEndpoint::new(result.candidate.base_url, ResolutionSource::Probe)
            }
            None => {
                let candidate = fallback::fallback(&config);
                tracing::warn!(
                    "No candidate reachable after {:?}, falling back to {}",
                    started.elapsed(),
                    candidate.base_url
                );
                ResolvedEndpoint::new(candidate.base_url, ResolutionSource::Fallback)
            }
        };

        self.remember(&config, endpoint.clone());
        endpoint
    }

    /// Unconditionally drop the current resolution
    ///
    /// A run already past winner selection is unaffected; the next
    /// `discover()` call starts fresh.
    pub fn invalidate(&self) {
        tracing::info!("Resolution invalidated");
        self.cache.invalidate();
    }

    /// Pin the backend address manually, bypassing discovery
    pub fn set_override(&self, url: &str) -> Result<(), DiscoveryError> {
        let validated = validate_base_url(url)?;
        tracing::info!("Override set to {}", validated);
        self.config.lock().override_url = Some(validated);
        self.cache.invalidate();
        Ok(())
    }

    fn remember(&self, config: &DiscoveryConfig, endpoint: ResolvedEndpoint) {
        self.cache.set(endpoint.clone());
        if let Some(path) = &config.cache_file {
            persist::store(path, &endpoint);
        }
    }
}

/// Probe candidates in priority-ordered batches, first reachable wins
///
/// Each batch runs fully concurrently as spawned tasks; a later batch is only
/// released once the previous one has drained without a winner. The shared
/// cancellation token stops every in-flight probe the moment a winner is
/// found, and the drop guard covers the overall-timeout path, where this
/// future is dropped while tasks are still running.
async fn probe_batches(
    client: &Client,
    config: &DiscoveryConfig,
    candidates: Vec<Candidate>,
) -> Option<ProbeResult> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    for batch in candidates.chunks(config.batch_size.max(1)) {
        let mut in_flight: FuturesUnordered<_> = batch
            .iter()
            .cloned()
            .map(|candidate| {
                let client = client.clone();
                let timeout = config.probe_timeout;
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    probe::probe(&client, candidate, timeout, &cancel).await
                })
            })
            .collect();

        // Consume results as they arrive rather than joining the whole batch
        while let Some(joined) = in_flight.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("Probe task failed to join: {}", e);
                    continue;
                }
            };

            if result.reachable {
                cancel.cancel();
                return Some(result);
            }
        }
    }

    None
}
