//! Backend endpoint discovery for development builds
//!
//! Finds a reachable API base address by concurrently probing candidate
//! endpoints (emulator loopbacks, common private subnets, hostname guesses),
//! caches the winner with a TTL, and falls back to a deterministic address
//! when nothing responds.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod persist;

pub use config::{DiscoveryConfig, PlatformProfile};
pub use discovery::DiscoveryService;
pub use error::DiscoveryError;
pub use models::{Candidate, CandidateOrigin, ProbeResult, ResolutionSource, ResolvedEndpoint};
