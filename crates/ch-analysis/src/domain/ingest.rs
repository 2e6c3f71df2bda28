//! # Batch Ingestion
//!
//! Sorts a mixed download batch into the shape one analysis run consumes:
//! at most one consensus, one vote per authority, and the authorities whose
//! fetches ran past their deadline.
//!
//! Selection rules:
//! - Among several consensuses, the freshest (greatest valid-after) wins;
//!   the first seen wins ties.
//! - Among several votes from the same authority, the last seen wins.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use shared_types::{ConsensusDocument, DocumentBatch, FetchOutcome, NetworkDocument, VoteDocument};

/// One run's worth of sorted input.
#[derive(Clone, Debug, Default)]
pub struct AnalysisInputs {
    pub consensus: Option<ConsensusDocument>,
    /// Votes keyed by authority nickname.
    pub votes: BTreeMap<String, VoteDocument>,
    /// Authorities whose fetch timed out.
    pub timed_out_authorities: BTreeSet<String>,
}

/// Splits a batch into consensus, votes, and timeout bookkeeping.
pub fn ingest(batch: DocumentBatch) -> AnalysisInputs {
    let mut inputs = AnalysisInputs::default();

    for document in batch.documents {
        match document {
            NetworkDocument::Consensus(consensus) => {
                let fresher = inputs
                    .consensus
                    .as_ref()
                    .is_none_or(|current| consensus.valid_after() > current.valid_after());
                if fresher {
                    inputs.consensus = Some(consensus);
                }
            }
            NetworkDocument::Vote(vote) => {
                let nickname = vote.nickname().to_string();
                if inputs.votes.insert(nickname.clone(), vote).is_some() {
                    warn!(authority = %nickname, "replacing earlier vote from the same authority");
                }
            }
        }
    }

    for fetch in batch.fetches {
        match fetch.outcome {
            FetchOutcome::TimedOut => {
                inputs.timed_out_authorities.insert(fetch.authority);
            }
            FetchOutcome::Failed => {
                warn!(authority = %fetch.authority, "document fetch failed");
            }
            FetchOutcome::Delivered => {}
        }
    }

    inputs
}
