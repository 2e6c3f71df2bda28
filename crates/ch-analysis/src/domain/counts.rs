//! # Relay Counts
//!
//! Informational tallies over status entries, plus the one count that does
//! produce a finding: bandwidth scanner coverage.

use std::collections::BTreeMap;

use shared_types::{Finding, Fingerprint, StatusEntry, VoteDocument};

pub fn running_relays(entries: &BTreeMap<Fingerprint, StatusEntry>) -> usize {
    entries.values().filter(|entry| entry.is_running()).count()
}

pub fn measured_relays(entries: &BTreeMap<Fingerprint, StatusEntry>) -> usize {
    entries
        .values()
        .filter(|entry| entry.measured_bandwidth.is_some())
        .count()
}

/// When votes exist but none carries a single bandwidth measurement, the
/// scanners are down network-wide. Scoped to the network: pointing at one
/// authority would be arbitrary when all of them are silent.
pub fn check_bandwidth_scanner_coverage(
    votes: &BTreeMap<String, VoteDocument>,
) -> Option<Finding> {
    if votes.is_empty() {
        return None;
    }
    let any_measured = votes
        .values()
        .any(|vote| measured_relays(vote.status_entries()) > 0);
    if any_measured {
        None
    } else {
        Some(Finding::bandwidth_scanner_results_missing())
    }
}
