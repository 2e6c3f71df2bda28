//! # Recommended Version Checks
//!
//! Version lists compare as ordered sequences: authorities publish them
//! sorted, and any reordering or element difference is a real disagreement.
//! Also collects the versions the authorities' own relays run, which feeds
//! the unrecommended-versions check.

use std::collections::BTreeMap;

use shared_types::{AuthorityVersion, ConsensusDocument, Finding, VoteDocument, FLAG_AUTHORITY};

/// A vote that declares client or server versions differing from the
/// consensus gets one finding per differing list. Declaring no list is not
/// a discrepancy.
pub fn check_recommended_versions(
    consensus: &ConsensusDocument,
    vote: &VoteDocument,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(client_versions) = vote.client_versions() {
        if client_versions != consensus.client_versions() {
            findings.push(Finding::differing_client_versions(
                vote.nickname(),
                client_versions,
                consensus.client_versions(),
            ));
        }
    }

    if let Some(server_versions) = vote.server_versions() {
        if server_versions != consensus.server_versions() {
            findings.push(Finding::differing_server_versions(
                vote.nickname(),
                server_versions,
                consensus.server_versions(),
            ));
        }
    }

    findings
}

/// The versions the authorities' own relays advertise in the consensus,
/// keyed by the relay nickname. Only relays carrying the Authority flag
/// count; a duplicated nickname keeps the entry seen last in fingerprint
/// order.
pub fn authority_versions(consensus: &ConsensusDocument) -> Vec<AuthorityVersion> {
    let mut by_nickname: BTreeMap<String, AuthorityVersion> = BTreeMap::new();
    for entry in consensus.status_entries().values() {
        if !entry.has_flag(FLAG_AUTHORITY) {
            continue;
        }
        by_nickname.insert(
            entry.nickname.clone(),
            AuthorityVersion {
                nickname: entry.nickname.clone(),
                fingerprint: entry.fingerprint.clone(),
                version: entry.version.clone(),
            },
        );
    }
    by_nickname.into_values().collect()
}

/// Authority relays running a version outside the consensus's recommended
/// server versions get a finding. Skipped entirely when the consensus
/// recommends nothing, and for relays that advertise no version.
pub fn check_authority_relay_versions(consensus: &ConsensusDocument) -> Vec<Finding> {
    let recommended = consensus.server_versions();
    if recommended.is_empty() {
        return Vec::new();
    }

    authority_versions(consensus)
        .into_iter()
        .filter_map(|authority| {
            let version = authority.version?;
            if recommended.contains(&version) {
                return None;
            }
            Some(Finding::unrecommended_version(
                authority.nickname,
                authority.fingerprint,
                version,
                recommended,
            ))
        })
        .collect()
}
