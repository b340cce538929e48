use clap::Parser;
use std::time::Duration;

/// Command-line interface for the apiscout binary
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "apiscout",
    about = "Locates a reachable backend API address during development by probing candidate endpoints",
    version
)]
pub struct Cli {
    /// Explicit backend address; disables probing entirely
    #[clap(long, env("APISCOUT_OVERRIDE_URL"))]
    pub override_url: Option<String>,

    /// Platform profile to use for candidate heuristics (android, ios, desktop)
    #[clap(long, env("APISCOUT_PLATFORM"))]
    pub platform: Option<String>,

    /// Port the backend is expected to listen on
    #[clap(short, long, env("APISCOUT_PORT"))]
    pub port: Option<u16>,

    /// Timeout for a single candidate probe in milliseconds
    #[clap(long, env("APISCOUT_PROBE_TIMEOUT_MS"))]
    pub probe_timeout_ms: Option<u64>,

    /// Timeout for a whole discovery run in milliseconds
    #[clap(long, env("APISCOUT_OVERALL_TIMEOUT_MS"))]
    pub overall_timeout_ms: Option<u64>,

    /// File remembering the last resolution across restarts
    #[clap(long, env("APISCOUT_CACHE_FILE"))]
    pub cache_file: Option<String>,

    /// Keep running and rediscover on an interval
    #[clap(long, default_value = "false")]
    pub continuous: bool,

    /// Rediscovery interval in seconds for continuous mode
    #[clap(long, default_value = "60")]
    pub interval: u64,

    /// Drop any persisted resolution before the first run
    #[clap(long, default_value = "false")]
    pub invalidate_first: bool,
}

impl Cli {
    /// Get the rediscovery interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}
