use crate::error::DiscoveryError;
use crate::models::ResolvedEndpoint;
use std::fs;
use std::path::Path;

/// File-backed memory of the last resolution, used to speed up cold starts
///
/// A persisted address from a prior run is likely stale (different network,
/// different machine), so the service only ever feeds it back in as the first
/// probe candidate. Accordingly every failure here is logged and swallowed; a
/// missing or corrupt file just means a slower first discovery.

/// Load the persisted resolution if one exists
pub fn load(path: &Path) -> Option<ResolvedEndpoint> {
    if !path.exists() {
        return None;
    }

    match read_entry(path) {
        Ok(endpoint) => Some(endpoint),
        Err(e) => {
            tracing::warn!("Ignoring unreadable cache file {}: {}", path.display(), e);
            None
        }
    }
}

/// Persist a resolution, replacing any previous one
pub fn store(path: &Path, endpoint: &ResolvedEndpoint) {
    match write_entry(path, endpoint) {
        Ok(()) => tracing::debug!("Persisted resolution to {}", path.display()),
        Err(e) => {
            tracing::warn!("Failed to write cache file {}: {}", path.display(), e);
        }
    }
}

fn read_entry(path: &Path) -> Result<ResolvedEndpoint, DiscoveryError> {
    let raw = fs::read_to_string(path)?;
    let endpoint = serde_json::from_str(&raw)?;
    Ok(endpoint)
}

fn write_entry(path: &Path, endpoint: &ResolvedEndpoint) -> Result<(), DiscoveryError> {
    let json = serde_json::to_string_pretty(endpoint)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResolutionSource;

    #[test]
    fn round_trips_a_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoint.json");

        let endpoint = ResolvedEndpoint::new("http://192.168.1.100:8080", ResolutionSource::Probe);
        store(&path, &endpoint);

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, endpoint);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).is_none());
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoint.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(load(&path).is_none());
    }

    #[test]
    fn store_replaces_the_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoint.json");

        store(
            &path,
            &ResolvedEndpoint::new("http://10.0.0.1:8080", ResolutionSource::Fallback),
        );
        store(
            &path,
            &ResolvedEndpoint::new("http://10.0.0.2:8080", ResolutionSource::Probe),
        );

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.base_url, "http://10.0.0.2:8080");
        assert_eq!(loaded.source, ResolutionSource::Probe);
    }
}
