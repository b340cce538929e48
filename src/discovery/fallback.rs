use crate::config::DiscoveryConfig;
use crate::models::{Candidate, CandidateOrigin};

/// Deterministic last-resort candidate, returned when discovery exhausts
/// every candidate without a reachable one
///
/// Pure and total: callers always receive some address, so no other component
/// needs a "nothing found" branch. The address is the configured fallback
/// when set, otherwise the platform's first loopback candidate.
pub fn fallback(config: &DiscoveryConfig) -> Candidate {
    let base_url = match &config.fallback_url {
        Some(url) => url.clone(),
        None => {
            let host = config
                .platform
                .loopback_hosts
                .first()
                .map(String::as_str)
                .unwrap_or("127.0.0.1");
            config.candidate_url(host)
        }
    };

    Candidate::new(base_url, CandidateOrigin::Fallback)
}
