//! # Report Assembly
//!
//! Runs every check over one run's ingested inputs and merges the results
//! into a single `AnalysisReport`. Findings come out stable-sorted by kind,
//! authority, relay, with duplicate (kind, scope) pairs collapsed to the
//! first occurrence, so the list reads in taxonomy order and two runs over
//! the same inputs agree byte for byte apart from run identity.
//!
//! Per-vote checks are independent and run in parallel; the final sort
//! restores determinism.

use rayon::prelude::*;
use uuid::Uuid;

use shared_types::{
    AnalysisReport, ConsensusDocument, ConsensusSummary, DownloadStatisticsRow, Finding,
    ReportSections, UnixMillis, VoteDocument, VoteSummary,
};

use crate::config::AnalysisConfig;
use crate::domain::ingest::AnalysisInputs;
use crate::domain::{authority_keys, counts, field_checks, flag_overlap, params, roster, versions};

/// Sort findings into report order and collapse duplicate (kind, scope)
/// pairs, keeping the first occurrence. The sort is stable, so assembly
/// order decides which duplicate survives.
pub fn finalize_findings(findings: &mut Vec<Finding>) {
    findings.sort_by(|a, b| (a.kind, &a.scope).cmp(&(b.kind, &b.scope)));
    findings.dedup_by(|second, first| second.kind == first.kind && second.scope == first.scope);
}

/// Informational digest of the consensus document.
pub fn summarize_consensus(consensus: &ConsensusDocument) -> ConsensusSummary {
    ConsensusSummary {
        valid_after: consensus.valid_after(),
        consensus_method: consensus.consensus_method(),
        known_flags: consensus.known_flags().clone(),
        client_versions: consensus.client_versions().to_vec(),
        server_versions: consensus.server_versions().to_vec(),
        params: consensus.params().clone(),
        total_relays: consensus.status_entries().len(),
        running_relays: counts::running_relays(consensus.status_entries()),
    }
}

/// Informational digest of one vote, with its known-flag differences against
/// the consensus already computed.
pub fn summarize_vote(vote: &VoteDocument, consensus: &ConsensusDocument) -> VoteSummary {
    let (flags_only_in_vote, flags_only_in_consensus) =
        field_checks::known_flag_differences(consensus, vote);
    VoteSummary {
        nickname: vote.nickname().to_string(),
        known_flags: vote.known_flags().clone(),
        flags_only_in_vote,
        flags_only_in_consensus,
        consensus_methods: vote.consensus_methods().clone(),
        client_versions: vote.client_versions().map(<[String]>::to_vec),
        server_versions: vote.server_versions().map(<[String]>::to_vec),
        params: vote.params().cloned(),
        dir_key_expires: vote.dir_key_expires(),
        total_relays: vote.status_entries().len(),
        running_relays: counts::running_relays(vote.status_entries()),
        measured_relays: counts::measured_relays(vote.status_entries()),
    }
}

fn check_vote(
    consensus: &ConsensusDocument,
    vote: &VoteDocument,
    now: UnixMillis,
    config: &AnalysisConfig,
) -> (VoteSummary, Vec<Finding>) {
    let mut findings = Vec::new();
    if let Some(finding) = field_checks::check_consensus_method(consensus, vote) {
        findings.push(finding);
    }
    findings.extend(versions::check_recommended_versions(consensus, vote));
    findings.extend(params::check_consensus_params(
        consensus,
        vote,
        &config.known_params,
    ));
    if let Some(finding) =
        authority_keys::check_authority_key_expiry(vote, now, &config.expiry_bands)
    {
        findings.push(finding);
    }
    (summarize_vote(vote, consensus), findings)
}

/// Run every check and assemble the report for one run.
///
/// Checks run exactly when their own inputs are present. Without a
/// consensus the report degrades to a no-consensus-known finding plus the
/// checks that need only the fetch records, the votes, and the configured
/// roster; every document comparison is skipped.
pub fn build_report(
    run_id: Uuid,
    now: UnixMillis,
    inputs: &AnalysisInputs,
    config: &AnalysisConfig,
    download_statistics: Vec<DownloadStatisticsRow>,
) -> AnalysisReport {
    let mut findings = roster::check_download_timeouts(&inputs.timed_out_authorities);
    findings.extend(roster::check_expected_votes(
        &inputs.votes,
        &config.expected_authorities,
    ));
    findings.extend(roster::check_votes_present(
        &inputs.votes,
        &config.expected_authorities,
    ));

    let Some(consensus) = inputs.consensus.as_ref() else {
        findings.push(Finding::no_consensus_known());
        finalize_findings(&mut findings);
        let sections = ReportSections {
            download_statistics,
            ..ReportSections::default()
        };
        return AnalysisReport::new(run_id, now, findings, sections);
    };

    findings.extend(field_checks::check_consensus_freshness(
        consensus,
        now,
        config.freshness_window_millis,
    ));

    let vote_list: Vec<(&String, &VoteDocument)> = inputs.votes.iter().collect();
    let per_vote: Vec<(VoteSummary, Vec<Finding>)> = vote_list
        .par_iter()
        .map(|&(_, vote)| check_vote(consensus, vote, now, config))
        .collect();

    let mut vote_summaries = Vec::with_capacity(per_vote.len());
    for (summary, vote_findings) in per_vote {
        vote_summaries.push(summary);
        findings.extend(vote_findings);
    }

    findings.extend(counts::check_bandwidth_scanner_coverage(&inputs.votes));
    findings.extend(versions::check_authority_relay_versions(consensus));
    findings.extend(roster::check_expected_consensus_entries(
        consensus,
        &config.expected_authorities,
    ));
    findings.extend(roster::check_consensus_rosters(consensus, &inputs.votes));

    let (overlap, relay_flags) = flag_overlap::classify_network(consensus, &inputs.votes);

    finalize_findings(&mut findings);

    let sections = ReportSections {
        consensus: Some(summarize_consensus(consensus)),
        votes: vote_summaries,
        flag_overlap: overlap.into_rows(),
        relay_flags,
        authority_versions: versions::authority_versions(consensus),
        download_statistics,
    };

    AnalysisReport::new(run_id, now, findings, sections)
}
