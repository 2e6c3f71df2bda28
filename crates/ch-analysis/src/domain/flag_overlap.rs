//! # Flag Agreement Classifier
//!
//! For every relay, authority, and flag, decides how the authority's vote
//! relates to the consensus, then aggregates two views: per-(authority, flag)
//! tallies and a per-relay matrix.
//!
//! The per-relay work is independent, so relays are classified in parallel.
//! Tallies merge order-independently and the matrix keeps fingerprint order,
//! which makes the whole pass deterministic.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use shared_types::{
    ConsensusDocument, Fingerprint, FlagCell, FlagClassification, FlagOverlapRow, RelayFlagRow,
    VoteDocument,
};

/// Classify one authority's opinion on one flag for one relay.
///
/// The outcome is total and non-overlapping:
/// - `NotApplicable` when the vote has no entry for the relay, or when
///   neither side assigns the flag in a comparable way.
/// - `Agree` when the vote assigns the flag and the consensus either assigns
///   it too or does not list the relay at all.
/// - `VoteOnly` when the vote assigns the flag but the consensus lists the
///   relay without it.
/// - `ConsensusOnly` when the consensus assigns a flag the vote omits even
///   though the authority evaluates that flag.
pub fn classify(
    vote: &VoteDocument,
    consensus: &ConsensusDocument,
    fingerprint: &Fingerprint,
    flag: &str,
) -> FlagClassification {
    let Some(vote_entry) = vote.status_entry(fingerprint) else {
        return FlagClassification::NotApplicable;
    };
    let consensus_entry = consensus.status_entry(fingerprint);

    if vote_entry.has_flag(flag) {
        match consensus_entry {
            Some(entry) if !entry.has_flag(flag) => FlagClassification::VoteOnly,
            _ => FlagClassification::Agree,
        }
    } else {
        match consensus_entry {
            Some(entry) if entry.has_flag(flag) && vote.known_flags().contains(flag) => {
                FlagClassification::ConsensusOnly
            }
            _ => FlagClassification::NotApplicable,
        }
    }
}

/// Key of one tally cell: which authority, which flag.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TallyKey {
    pub authority: String,
    pub flag: String,
}

/// Classification counts for one tally cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlagCounts {
    pub agree: u64,
    pub vote_only: u64,
    pub consensus_only: u64,
}

impl FlagCounts {
    fn bump(&mut self, classification: FlagClassification) {
        match classification {
            FlagClassification::Agree => self.agree += 1,
            FlagClassification::VoteOnly => self.vote_only += 1,
            FlagClassification::ConsensusOnly => self.consensus_only += 1,
            FlagClassification::NotApplicable => {}
        }
    }

    fn add(&mut self, other: FlagCounts) {
        self.agree += other.agree;
        self.vote_only += other.vote_only;
        self.consensus_only += other.consensus_only;
    }
}

/// Accumulates classification tallies across relays.
///
/// Merging two summaries in either order yields the same table; the parallel
/// pass relies on that.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlagOverlapSummary {
    counts: BTreeMap<TallyKey, FlagCounts>,
}

impl FlagOverlapSummary {
    pub fn record(&mut self, authority: &str, flag: &str, classification: FlagClassification) {
        if classification == FlagClassification::NotApplicable {
            return;
        }
        let key = TallyKey {
            authority: authority.to_string(),
            flag: flag.to_string(),
        };
        self.counts.entry(key).or_default().bump(classification);
    }

    pub fn merge(&mut self, other: FlagOverlapSummary) {
        for (key, counts) in other.counts {
            self.counts.entry(key).or_default().add(counts);
        }
    }

    pub fn get(&self, authority: &str, flag: &str) -> Option<FlagCounts> {
        let key = TallyKey {
            authority: authority.to_string(),
            flag: flag.to_string(),
        };
        self.counts.get(&key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Flattens the table into report rows, already sorted by authority and
    /// flag.
    pub fn into_rows(self) -> Vec<FlagOverlapRow> {
        self.counts
            .into_iter()
            .map(|(key, counts)| FlagOverlapRow {
                authority: key.authority,
                flag: key.flag,
                agree: counts.agree,
                vote_only: counts.vote_only,
                consensus_only: counts.consensus_only,
            })
            .collect()
    }
}

/// Classify every (relay, authority, flag) combination in one pass.
///
/// The flag universe is the union of all known-flags declarations; the relay
/// universe is the union of all status entries. Every relay in the universe
/// gets a matrix row, including relays only the consensus lists.
pub fn classify_network(
    consensus: &ConsensusDocument,
    votes: &BTreeMap<String, VoteDocument>,
) -> (FlagOverlapSummary, Vec<RelayFlagRow>) {
    let flags = flag_universe(consensus, votes);
    let fingerprints = fingerprint_universe(consensus, votes);

    let per_relay: Vec<(FlagOverlapSummary, RelayFlagRow)> = fingerprints
        .par_iter()
        .map(|fingerprint| classify_relay(consensus, votes, &flags, fingerprint))
        .collect();

    let mut summary = FlagOverlapSummary::default();
    let mut rows = Vec::with_capacity(per_relay.len());
    for (partial, row) in per_relay {
        summary.merge(partial);
        rows.push(row);
    }
    (summary, rows)
}

fn flag_universe(
    consensus: &ConsensusDocument,
    votes: &BTreeMap<String, VoteDocument>,
) -> BTreeSet<String> {
    let mut flags = consensus.known_flags().clone();
    for vote in votes.values() {
        flags.extend(vote.known_flags().iter().cloned());
    }
    flags
}

fn fingerprint_universe(
    consensus: &ConsensusDocument,
    votes: &BTreeMap<String, VoteDocument>,
) -> BTreeSet<Fingerprint> {
    let mut fingerprints: BTreeSet<Fingerprint> =
        consensus.status_entries().keys().cloned().collect();
    for vote in votes.values() {
        fingerprints.extend(vote.status_entries().keys().cloned());
    }
    fingerprints
}

fn classify_relay(
    consensus: &ConsensusDocument,
    votes: &BTreeMap<String, VoteDocument>,
    flags: &BTreeSet<String>,
    fingerprint: &Fingerprint,
) -> (FlagOverlapSummary, RelayFlagRow) {
    let mut partial = FlagOverlapSummary::default();
    let mut vote_cells = BTreeMap::new();

    for (authority, vote) in votes {
        if !vote.contains_status_entry(fingerprint) {
            continue;
        }
        let mut cells = Vec::new();
        for flag in flags {
            let classification = classify(vote, consensus, fingerprint, flag);
            if classification == FlagClassification::NotApplicable {
                continue;
            }
            partial.record(authority, flag, classification);
            cells.push(FlagCell {
                flag: flag.clone(),
                classification,
            });
        }
        // An empty cell list still marks that this authority listed the relay.
        vote_cells.insert(authority.clone(), cells);
    }

    let consensus_entry = consensus.status_entry(fingerprint);
    let nickname = consensus_entry
        .map(|entry| entry.nickname.clone())
        .or_else(|| {
            votes
                .values()
                .filter_map(|vote| vote.status_entry(fingerprint))
                .map(|entry| entry.nickname.clone())
                .last()
        })
        .unwrap_or_default();

    let row = RelayFlagRow {
        fingerprint: fingerprint.clone(),
        nickname,
        vote_cells,
        consensus_flags: consensus_entry.map(|entry| entry.flags.clone()),
    };
    (partial, row)
}
