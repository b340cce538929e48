use crate::error::DiscoveryError;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1_000;
const DEFAULT_OVERALL_TIMEOUT_MS: u64 = 8_000;
const DEFAULT_PROBE_TTL_SECS: u64 = 300;
const DEFAULT_FALLBACK_TTL_SECS: u64 = 30;
const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_MAX_CANDIDATES: usize = 100;

/// Private subnets swept by the candidate generator, most common first.
/// Deliberately a short fixed list rather than a full /24 walk so the total
/// candidate count stays bounded.
static DEFAULT_SUBNETS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "192.168.1", "192.168.0", "192.168.100", "10.0.0", "10.0.1", "172.20.10",
    ]
});

/// Host suffixes tried within each swept subnet
static DEFAULT_HOST_NUMBERS: Lazy<Vec<u8>> = Lazy::new(|| vec![1, 2, 100, 101, 102]);

/// Hostname-based guesses appended after the subnet sweep
static DEFAULT_HOSTNAMES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["host.docker.internal", "dev-api.local"]);

/// Per-platform candidate heuristics, selected once at startup
///
/// Keeps the discovery algorithm itself free of platform branches: the only
/// thing that differs between an Android emulator and a desktop run is this
/// struct.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub name: &'static str,
    /// Loopback hosts as seen from this platform
    pub loopback_hosts: Vec<String>,
    /// Subnet prefixes swept for backend hosts
    pub subnets: Vec<String>,
    /// Host suffixes tried within each subnet
    pub host_numbers: Vec<u8>,
    /// Hostname guesses tried after address-based candidates
    pub hostnames: Vec<String>,
    /// Default per-probe timeout for this platform
    pub probe_timeout: Duration,
}

impl PlatformProfile {
    /// Android emulators reach the host machine through the virtual router,
    /// not 127.0.0.1, and their network stack is slower to come up.
    pub fn android() -> Self {
        Self {
            name: "android",
            loopback_hosts: vec![
                // AVD virtual router
                "10.0.2.2".to_string(),
                // Genymotion virtual router
                "10.0.3.2".to_string(),
            ],
            subnets: DEFAULT_SUBNETS.iter().map(|s| s.to_string()).collect(),
            host_numbers: DEFAULT_HOST_NUMBERS.clone(),
            hostnames: DEFAULT_HOSTNAMES.iter().map(|s| s.to_string()).collect(),
            probe_timeout: Duration::from_millis(2_000),
        }
    }

    /// The iOS simulator shares the host network stack
    pub fn ios() -> Self {
        Self {
            name: "ios",
            loopback_hosts: vec!["127.0.0.1".to_string(), "localhost".to_string()],
            subnets: DEFAULT_SUBNETS.iter().map(|s| s.to_string()).collect(),
            host_numbers: DEFAULT_HOST_NUMBERS.clone(),
            hostnames: DEFAULT_HOSTNAMES.iter().map(|s| s.to_string()).collect(),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        }
    }

    pub fn desktop() -> Self {
        Self {
            name: "desktop",
            loopback_hosts: vec!["127.0.0.1".to_string()],
            subnets: DEFAULT_SUBNETS.iter().map(|s| s.to_string()).collect(),
            host_numbers: DEFAULT_HOST_NUMBERS.clone(),
            hostnames: DEFAULT_HOSTNAMES.iter().map(|s| s.to_string()).collect(),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        }
    }

    /// Resolve a profile by name as supplied via CLI or environment
    pub fn from_name(name: &str) -> Result<Self, DiscoveryError> {
        match name.to_lowercase().as_str() {
            "android" => Ok(Self::android()),
            "ios" => Ok(Self::ios()),
            "desktop" => Ok(Self::desktop()),
            other => Err(DiscoveryError::ConfigError(format!(
                "Unknown platform '{}', expected android, ios or desktop",
                other
            ))),
        }
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::desktop()
    }
}

/// Discovery service configuration
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Explicit backend address; when set, probing is skipped entirely
    pub override_url: Option<String>,

    /// Platform-specific candidate heuristics
    pub platform: PlatformProfile,

    /// Port the backend is expected to listen on
    pub port: u16,

    /// Base path appended to every candidate address
    pub base_path: String,

    /// Timeout for a single candidate probe
    pub probe_timeout: Duration,

    /// Timeout for one whole discovery run
    pub overall_timeout: Duration,

    /// How long a probe-confirmed resolution is trusted
    pub probe_ttl: Duration,

    /// How long a fallback resolution is trusted before rediscovery
    pub fallback_ttl: Duration,

    /// Number of candidates released for concurrent probing at a time
    pub batch_size: usize,

    /// Hard cap on the generated candidate list
    pub max_candidates: usize,

    /// Last-resort address; defaults to the first loopback candidate
    pub fallback_url: Option<String>,

    /// Optional JSON file remembering the last resolution across restarts
    pub cache_file: Option<PathBuf>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let platform = PlatformProfile::default();
        Self {
            override_url: None,
            probe_timeout: platform.probe_timeout,
            platform,
            port: DEFAULT_PORT,
            base_path: String::new(),
            overall_timeout: Duration::from_millis(DEFAULT_OVERALL_TIMEOUT_MS),
            probe_ttl: Duration::from_secs(DEFAULT_PROBE_TTL_SECS),
            fallback_ttl: Duration::from_secs(DEFAULT_FALLBACK_TTL_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            fallback_url: None,
            cache_file: None,
        }
    }
}

impl DiscoveryConfig {
    /// Load configuration from environment variables
    ///
    /// A malformed override or fallback address is a setup mistake, not a
    /// transient network condition, and fails loudly here.
    pub fn from_env() -> Result<Self, DiscoveryError> {
        let platform = match env::var("APISCOUT_PLATFORM") {
            Ok(name) => PlatformProfile::from_name(&name)?,
            Err(_) => PlatformProfile::default(),
        };

        let override_url = match env::var("APISCOUT_OVERRIDE_URL") {
            Ok(raw) => Some(validate_base_url(&raw)?),
            Err(_) => None,
        };

        let fallback_url = match env::var("APISCOUT_FALLBACK_URL") {
            Ok(raw) => Some(validate_base_url(&raw)?),
            Err(_) => None,
        };

        let port = env::var("APISCOUT_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let probe_timeout = env::var("APISCOUT_PROBE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(platform.probe_timeout);

        let overall_timeout = env::var("APISCOUT_OVERALL_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_OVERALL_TIMEOUT_MS));

        let cache_file = env::var("APISCOUT_CACHE_FILE").ok().map(PathBuf::from);

        if let Some(url) = &override_url {
            tracing::info!("Using configured override address: {}", url);
        } else {
            tracing::info!(
                "No override configured, discovery will probe candidates for platform {}",
                platform.name
            );
        }

        Ok(DiscoveryConfig {
            override_url,
            probe_timeout,
            platform,
            port,
            base_path: String::new(),
            overall_timeout,
            probe_ttl: Duration::from_secs(DEFAULT_PROBE_TTL_SECS),
            fallback_ttl: Duration::from_secs(DEFAULT_FALLBACK_TTL_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            fallback_url,
            cache_file,
        })
    }

    /// Build a candidate base URL for a bare host using the configured port
    /// and base path
    pub fn candidate_url(&self, host: &str) -> String {
        format!("http://{}:{}{}", host, self.port, self.base_path)
    }
}

/// Validate and normalize a user-supplied base address
///
/// Accepts http/https URLs with a host; a bare `host:port` is rejected rather
/// than guessed at. The trailing slash is stripped so candidate comparison
/// and health-path joining stay uniform.
pub fn validate_base_url(raw: &str) -> Result<String, DiscoveryError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| DiscoveryError::ConfigError(format!("Malformed address '{}': {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(DiscoveryError::ConfigError(format!(
                "Unsupported scheme '{}' in address '{}'",
                other, raw
            )))
        }
    }

    if parsed.host_str().is_none() {
        return Err(DiscoveryError::ConfigError(format!(
            "Address '{}' has no host",
            raw
        )));
    }

    Ok(raw.trim().trim_end_matches('/').to_string())
}
