//! Network selection policy.
//!
//! Ranks scan observations against the registry to pick the next station
//! candidate. Pure functions of (registry, observations): deterministic,
//! side-effect-free, and unit-testable without a driver.

use crate::models::{NetworkProfile, ScanObservation, SecurityKind};
use crate::registry::NetworkRegistry;

/// A registry entry matched with a scan observation.
///
/// Each matching (entry, observation) pair is its own candidate: the same
/// SSID observed on several access points yields several candidates, as do
/// duplicate registry entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Index of the matched entry in the registry (registration order).
    pub network_index: usize,
    /// Credentials and addressing taken from the registry.
    pub profile: NetworkProfile,
    pub rssi: i32,
    pub security: SecurityKind,
    pub channel: u8,
    pub bssid: [u8; 6],
}

/// Ranks all matching candidates, strongest signal first.
///
/// SSID matching is case-sensitive and exact. Ties on signal strength
/// resolve to the earlier-registered entry. An empty result means no
/// observed access point matched any registry entry.
pub fn rank(registry: &NetworkRegistry, observations: &[ScanObservation]) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for (network_index, profile) in registry.networks().iter().enumerate() {
        for obs in observations {
            if obs.ssid != profile.ssid {
                continue;
            }
            candidates.push(Candidate {
                network_index,
                profile: profile.clone(),
                rssi: obs.rssi,
                security: obs.security,
                channel: obs.channel,
                bssid: obs.bssid,
            });
        }
    }

    candidates.sort_by(|a, b| {
        b.rssi
            .cmp(&a.rssi)
            .then(a.network_index.cmp(&b.network_index))
    });
    candidates
}

/// The single best candidate, if any registry entry was observed.
pub fn best(registry: &NetworkRegistry, observations: &[ScanObservation]) -> Option<Candidate> {
    rank(registry, observations).into_iter().next()
}
