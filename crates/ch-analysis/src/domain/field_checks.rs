//! # Scalar Field Checks
//!
//! Comparisons between one vote and the consensus over scalar and set-valued
//! document attributes: known flags, consensus method, and freshness.

use std::collections::BTreeSet;

use shared_types::{ConsensusDocument, Finding, UnixMillis, VoteDocument};

/// Flags evaluated on only one side.
///
/// Returns the flags only the vote declares, then the flags only the
/// consensus declares. Informational; known-flag drift alone is not a
/// finding.
pub fn known_flag_differences(
    consensus: &ConsensusDocument,
    vote: &VoteDocument,
) -> (BTreeSet<String>, BTreeSet<String>) {
    let only_in_vote = vote
        .known_flags()
        .difference(consensus.known_flags())
        .cloned()
        .collect();
    let only_in_consensus = consensus
        .known_flags()
        .difference(vote.known_flags())
        .cloned()
        .collect();
    (only_in_vote, only_in_consensus)
}

/// An authority that does not support the method the consensus was built
/// with gets a finding. An empty supported set counts as not supporting.
pub fn check_consensus_method(
    consensus: &ConsensusDocument,
    vote: &VoteDocument,
) -> Option<Finding> {
    let method = consensus.consensus_method();
    if vote.consensus_methods().contains(&method) {
        return None;
    }
    Some(Finding::consensus_method_not_supported(
        vote.nickname(),
        method,
        vote.consensus_methods(),
    ))
}

/// A consensus older than the freshness window gets a finding. A valid-after
/// in the future counts as fresh.
pub fn check_consensus_freshness(
    consensus: &ConsensusDocument,
    now: UnixMillis,
    freshness_window_millis: u64,
) -> Option<Finding> {
    let age = now.saturating_sub(consensus.valid_after());
    if age > freshness_window_millis {
        Some(Finding::consensus_not_fresh(consensus.valid_after(), now))
    } else {
        None
    }
}
