//! # Roster Conformance
//!
//! Checks that the set of participants looks like it should: every expected
//! authority voted, sits in the consensus under its own identity key, and is
//! accounted for by the consensus's own roster lines. Each check needs only
//! the inputs it takes, so the vote-side checks still run when no consensus
//! arrived.

use std::collections::{BTreeMap, BTreeSet};

use shared_types::{ConsensusDocument, Finding, Fingerprint, VoteDocument, FLAG_AUTHORITY};

/// One finding per authority whose fetch ran past its deadline.
pub fn check_download_timeouts(timed_out_authorities: &BTreeSet<String>) -> Vec<Finding> {
    timed_out_authorities
        .iter()
        .map(Finding::consensus_download_timeout)
        .collect()
}

/// One finding per expected authority that cast no vote this run.
pub fn check_expected_votes(
    votes: &BTreeMap<String, VoteDocument>,
    expected_authorities: &BTreeMap<String, Fingerprint>,
) -> Vec<Finding> {
    expected_authorities
        .keys()
        .filter(|nickname| !votes.contains_key(*nickname))
        .map(Finding::votes_missing)
        .collect()
}

/// Checks every expected authority against the consensus entries.
///
/// An expected authority without an Authority-flagged entry under its
/// nickname is missing from the consensus. An entry using an expected
/// nickname with a different identity key is an unexpected fingerprint; the
/// first such entry in fingerprint order is reported.
pub fn check_expected_consensus_entries(
    consensus: &ConsensusDocument,
    expected_authorities: &BTreeMap<String, Fingerprint>,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (nickname, fingerprint) in expected_authorities {
        let mut flagged_entry_present = false;
        let mut mismatched: Option<&Fingerprint> = None;
        for entry in consensus.status_entries().values() {
            if entry.nickname != *nickname {
                continue;
            }
            if entry.has_flag(FLAG_AUTHORITY) {
                flagged_entry_present = true;
            }
            if entry.fingerprint != *fingerprint && mismatched.is_none() {
                mismatched = Some(&entry.fingerprint);
            }
        }

        if !flagged_entry_present {
            findings.push(Finding::missing_authority(nickname));
        }
        if let Some(actual) = mismatched {
            findings.push(Finding::unexpected_fingerprint(
                nickname,
                fingerprint.clone(),
                actual.clone(),
            ));
        }
    }

    findings
}

/// Checks the consensus's own roster lines, when the parser supplied them.
///
/// A vote in the run from an authority the consensus does not list as voting
/// means that consensus was computed without it. A voting authority absent
/// from the signature roster failed to sign.
pub fn check_consensus_rosters(
    consensus: &ConsensusDocument,
    votes: &BTreeMap<String, VoteDocument>,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let Some(voting) = consensus.voting_authorities() else {
        return findings;
    };

    for nickname in votes.keys() {
        if !voting.contains(nickname) {
            findings.push(Finding::consensus_missing_votes(nickname));
        }
    }

    if let Some(signing) = consensus.signing_authorities() {
        for nickname in voting {
            if !signing.contains(nickname) {
                findings.push(Finding::consensus_missing_signatures(nickname));
            }
        }
    }

    findings
}

/// The network-wide votes-missing finding for a run with no votes at all.
/// With a roster configured the per-authority findings carry the news
/// instead.
pub fn check_votes_present(
    votes: &BTreeMap<String, VoteDocument>,
    expected_authorities: &BTreeMap<String, Fingerprint>,
) -> Option<Finding> {
    if votes.is_empty() && expected_authorities.is_empty() {
        Some(Finding::votes_missing_network_wide())
    } else {
        None
    }
}
