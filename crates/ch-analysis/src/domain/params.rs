//! # Consensus Parameter Checks
//!
//! Votes may only set parameters from the known list or the bandwidth
//! scanner namespace, and the values they set must match what the consensus
//! carries.

use std::collections::{BTreeMap, BTreeSet};

use shared_types::{ConsensusDocument, Finding, VoteDocument};

/// Keys under this prefix belong to the bandwidth scanners and are never
/// reported as unknown.
pub const BWAUTH_PARAM_PREFIX: &str = "bwauth";

fn is_known(key: &str, known_params: &BTreeSet<String>) -> bool {
    known_params.contains(key) || key.starts_with(BWAUTH_PARAM_PREFIX)
}

/// Compare one vote's parameters against the consensus.
///
/// A key offends when the consensus does not carry it, carries a different
/// value, or the key is unknown. Any offending key yields one conflicting
/// finding carrying the vote's full parameter list; unknown keys additionally
/// yield an unknown-params finding naming just those keys. A vote without a
/// parameter list expressed no opinion and yields nothing.
pub fn check_consensus_params(
    consensus: &ConsensusDocument,
    vote: &VoteDocument,
    known_params: &BTreeSet<String>,
) -> Vec<Finding> {
    let Some(vote_params) = vote.params() else {
        return Vec::new();
    };

    let mut offending_keys = Vec::new();
    let mut unknown = BTreeMap::new();

    for (key, value) in vote_params {
        let known = is_known(key, known_params);
        let conflicting = consensus.params().get(key) != Some(value);
        if conflicting || !known {
            offending_keys.push(key.clone());
        }
        if !known {
            unknown.insert(key.clone(), *value);
        }
    }

    let mut findings = Vec::new();
    if !unknown.is_empty() {
        findings.push(Finding::unknown_consensus_params(vote.nickname(), unknown));
    }
    if !offending_keys.is_empty() {
        findings.push(Finding::conflicting_consensus_params(
            vote.nickname(),
            vote_params.clone(),
            offending_keys,
        ));
    }
    findings
}
