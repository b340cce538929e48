use crate::models::{ResolutionSource, ResolvedEndpoint};
use chrono::Utc;
use parking_lot::Mutex;
use std::time::Duration;

/// Holds the current resolution with a per-source time-to-live
///
/// The cache exclusively owns the stored `ResolvedEndpoint`; writes replace
/// the whole entry (last writer wins), there is no partial-update path.
/// Fallback resolutions expire sooner than probe-confirmed ones so a guess is
/// retried quickly while a confirmed address is trusted longer.
#[derive(Debug)]
pub struct ResolutionCache {
    entry: Mutex<Option<ResolvedEndpoint>>,
    probe_ttl: Duration,
    fallback_ttl: Duration,
}

impl ResolutionCache {
    pub fn new(probe_ttl: Duration, fallback_ttl: Duration) -> Self {
        Self {
            entry: Mutex::new(None),
            probe_ttl,
            fallback_ttl,
        }
    }

    /// Get the stored resolution if present and not expired
    pub fn get(&self) -> Option<ResolvedEndpoint> {
        let guard = self.entry.lock();
        match guard.as_ref() {
            Some(entry) if self.is_fresh(entry) => Some(entry.clone()),
            _ => None,
        }
    }

    /// Get the stored address even when expired
    ///
    /// Feeds the generator's re-validate-first heuristic; the address is only
    /// ever used as a probe candidate, never returned to callers directly.
    pub fn last_known(&self) -> Option<String> {
        self.entry.lock().as_ref().map(|e| e.base_url.clone())
    }

    /// Replace the stored resolution
    pub fn set(&self, endpoint: ResolvedEndpoint) {
        let mut guard = self.entry.lock();
        *guard = Some(endpoint);
    }

    /// Seed the cache with an address that must not be trusted yet
    ///
    /// The entry is stored already expired: `get()` keeps missing so a
    /// discovery run happens, while `last_known()` surfaces the address as
    /// the first candidate to re-validate. Used for persisted cold-start
    /// hints.
    pub fn seed(&self, base_url: String) {
        let mut guard = self.entry.lock();
        *guard = Some(ResolvedEndpoint {
            base_url,
            resolved_at: chrono::DateTime::<Utc>::UNIX_EPOCH,
            source: ResolutionSource::Cache,
        });
    }

    /// Unconditionally clear the stored resolution
    ///
    /// Called by the host application on a detected network change or for a
    /// manual reset; the next discovery starts fresh.
    pub fn invalidate(&self) {
        let mut guard = self.entry.lock();
        *guard = None;
    }

    fn ttl_for(&self, source: ResolutionSource) -> Duration {
        match source {
            ResolutionSource::Fallback => self.fallback_ttl,
            _ => self.probe_ttl,
        }
    }

    fn is_fresh(&self, entry: &ResolvedEndpoint) -> bool {
        let elapsed = Utc::now().signed_duration_since(entry.resolved_at);
        match elapsed.to_std() {
            Ok(elapsed) => elapsed <= self.ttl_for(entry.source),
            // A resolution timestamped in the future is treated as fresh
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn backdated(source: ResolutionSource, age_secs: i64) -> ResolvedEndpoint {
        let mut endpoint = ResolvedEndpoint::new("http://127.0.0.1:8080", source);
        endpoint.resolved_at = Utc::now() - ChronoDuration::seconds(age_secs);
        endpoint
    }

    #[test]
    fn fresh_probe_entry_is_returned() {
        let cache = ResolutionCache::new(Duration::from_secs(300), Duration::from_secs(30));
        cache.set(backdated(ResolutionSource::Probe, 299));
        assert!(cache.get().is_some());
    }

    #[test]
    fn expired_probe_entry_is_not_returned() {
        let cache = ResolutionCache::new(Duration::from_secs(300), Duration::from_secs(30));
        cache.set(backdated(ResolutionSource::Probe, 301));
        assert!(cache.get().is_none());
    }

    #[test]
    fn fallback_entries_use_the_short_ttl() {
        let cache = ResolutionCache::new(Duration::from_secs(300), Duration::from_secs(30));

        // Old enough to outlive the fallback TTL but not the probe TTL
        cache.set(backdated(ResolutionSource::Fallback, 31));
        assert!(cache.get().is_none());

        cache.set(backdated(ResolutionSource::Fallback, 29));
        assert!(cache.get().is_some());
    }

    #[test]
    fn invalidate_clears_the_entry() {
        let cache = ResolutionCache::new(Duration::from_secs(300), Duration::from_secs(30));
        cache.set(backdated(ResolutionSource::Probe, 0));
        assert!(cache.get().is_some());

        cache.invalidate();
        assert!(cache.get().is_none());
        assert!(cache.last_known().is_none());
    }

    #[test]
    fn seeded_entry_is_stale_but_known() {
        let cache = ResolutionCache::new(Duration::from_secs(300), Duration::from_secs(30));
        cache.seed("http://192.168.1.100:8080".to_string());

        assert!(cache.get().is_none());
        assert_eq!(
            cache.last_known().as_deref(),
            Some("http://192.168.1.100:8080")
        );
    }

    #[test]
    fn last_known_survives_expiry() {
        let cache = ResolutionCache::new(Duration::from_secs(300), Duration::from_secs(30));
        cache.set(backdated(ResolutionSource::Probe, 10_000));

        assert!(cache.get().is_none());
        assert_eq!(cache.last_known().as_deref(), Some("http://127.0.0.1:8080"));
    }
}
