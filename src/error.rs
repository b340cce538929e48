use thiserror::Error;

/// Discovery error types
///
/// Probe-level failures (refused connections, timeouts, bad responses) are
/// deliberately absent: they collapse to an unreachable `ProbeResult` inside
/// the probe and never surface here.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP client error: {0}")]
    ClientError(String),

    #[error("Cache persistence error: {0}")]
    PersistError(String),
}

// From trait implementations for common error types
impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        DiscoveryError::ClientError(err.to_string())
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::PersistError(err.to_string())
    }
}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        DiscoveryError::PersistError(err.to_string())
    }
}

impl From<std::env::VarError> for DiscoveryError {
    fn from(err: std::env::VarError) -> Self {
        DiscoveryError::ConfigError(format!("Environment variable error: {}", err))
    }
}
