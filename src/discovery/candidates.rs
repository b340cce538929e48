use crate::config::DiscoveryConfig;
use crate::models::{Candidate, CandidateOrigin};
use std::collections::HashSet;

/// Build the ordered candidate list for one discovery run
///
/// Order encodes priority: explicit override, last known-good address,
/// platform loopbacks, the bounded subnet sweep, then hostname guesses.
/// Duplicates are removed preserving first occurrence, and the list is capped
/// so the worst-case probing cost stays bounded. Deterministic for fixed
/// inputs.
pub fn generate(config: &DiscoveryConfig, last_known: Option<&str>) -> Vec<Candidate> {
    // An override is trusted outright, nothing else is worth generating
    if let Some(url) = &config.override_url {
        return vec![Candidate::new(url.clone(), CandidateOrigin::Override)];
    }

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push = |candidate: Candidate, candidates: &mut Vec<Candidate>| {
        if candidates.len() >= config.max_candidates {
            return;
        }
        if seen.insert(candidate.base_url.clone()) {
            candidates.push(candidate);
        }
    };

    // The previous address is the most likely to still be correct, so it is
    // re-validated ahead of everything else
    if let Some(url) = last_known {
        push(
            Candidate::new(url.to_string(), CandidateOrigin::Cached),
            &mut candidates,
        );
    }

    for host in &config.platform.loopback_hosts {
        push(
            Candidate::new(config.candidate_url(host), CandidateOrigin::Loopback),
            &mut candidates,
        );
    }

    // Bounded sweep: a small fixed set of subnets crossed with a small fixed
    // set of host suffixes, never a full /24
    for subnet in &config.platform.subnets {
        for host_number in &config.platform.host_numbers {
            let host = format!("{}.{}", subnet, host_number);
            push(
                Candidate::new(config.candidate_url(&host), CandidateOrigin::Subnet),
                &mut candidates,
            );
        }
    }

    for hostname in &config.platform.hostnames {
        push(
            Candidate::new(config.candidate_url(hostname), CandidateOrigin::Hostname),
            &mut candidates,
        );
    }

    tracing::debug!(
        "Generated {} candidates for platform {}",
        candidates.len(),
        config.platform.name
    );

    candidates
}
