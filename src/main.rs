use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::signal;

use apiscout::cli::Cli;
use apiscout::config::{DiscoveryConfig, PlatformProfile};
use apiscout::discovery::DiscoveryService;
use apiscout::error::DiscoveryError;

#[tokio::main]
async fn main() -> Result<(), DiscoveryError> {
    // Initialize environment
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let service = DiscoveryService::new(config)?;

    if cli.invalidate_first {
        service.invalidate();
    }

    run_once(&service).await;

    // In continuous mode, keep rediscovering until ctrl-c; the cache TTL
    // decides when a tick actually probes again
    if cli.continuous {
        tracing::info!(
            "Continuous mode: checking every {} seconds, ctrl-c to stop",
            cli.interval
        );

        let mut interval = tokio::time::interval(cli.interval());
        // The first tick completes immediately and we already ran once
        interval.tick().await;

        loop {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    tracing::info!("Received shutdown signal, exiting");
                    break;
                }
                _ = interval.tick() => {
                    run_once(&service).await;
                }
            }
        }
    }

    Ok(())
}

/// Merge environment configuration with command-line flags (flags win)
fn build_config(cli: &Cli) -> Result<DiscoveryConfig, DiscoveryError> {
    let mut config = DiscoveryConfig::from_env()?;

    if let Some(name) = &cli.platform {
        config.platform = PlatformProfile::from_name(name)?;
        config.probe_timeout = config.platform.probe_timeout;
    }
    if let Some(ms) = cli.probe_timeout_ms {
        config.probe_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = cli.overall_timeout_ms {
        config.overall_timeout = Duration::from_millis(ms);
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(url) = &cli.override_url {
        // Validated when the service is constructed
        config.override_url = Some(url.clone());
    }
    if let Some(path) = &cli.cache_file {
        config.cache_file = Some(PathBuf::from(path));
    }

    Ok(config)
}

async fn run_once(service: &DiscoveryService) {
    let started = Instant::now();
    let endpoint = service.discover().await;

    tracing::info!(
        "Backend base address: {} (source: {:?}, took {} ms)",
        endpoint.base_url,
        endpoint.source,
        started.elapsed().as_millis()
    );

    // The resolved address is the program's one line of output
    println!("{}", endpoint.base_url);
}
