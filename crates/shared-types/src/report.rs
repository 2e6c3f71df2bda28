//! # Analysis Report
//!
//! The presentation-agnostic output of one analysis run: the ordered finding
//! list plus the informational sections renderers draw tables from. Every
//! collection in here is sorted before the report is assembled, so two runs
//! over the same inputs serialize identically apart from run identity.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::documents::{Fingerprint, UnixMillis};
use crate::findings::{Finding, WarningKind};

/// How one authority's opinion on one flag for one relay relates to the
/// consensus.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FlagClassification {
    /// Vote and consensus agree, or the relay is absent from the consensus.
    Agree,
    /// The vote assigns the flag but the consensus does not.
    VoteOnly,
    /// The consensus assigns the flag, the vote does not, and the authority
    /// evaluates that flag.
    ConsensusOnly,
    /// The authority expressed no opinion that could be compared.
    NotApplicable,
}

/// One flag opinion within a relay's row of the flag matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagCell {
    pub flag: String,
    pub classification: FlagClassification,
}

/// One relay's row in the per-relay flag matrix: every authority's compared
/// opinions next to what the consensus says.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayFlagRow {
    pub fingerprint: Fingerprint,
    pub nickname: String,
    /// Compared flag opinions per voting authority. Authorities without a
    /// status entry for this relay have no key here.
    pub vote_cells: BTreeMap<String, Vec<FlagCell>>,
    /// Flags the consensus assigns, absent when the consensus does not list
    /// the relay.
    pub consensus_flags: Option<BTreeSet<String>>,
}

/// Aggregated classification tallies for one (authority, flag) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagOverlapRow {
    pub authority: String,
    pub flag: String,
    pub agree: u64,
    pub vote_only: u64,
    pub consensus_only: u64,
}

/// Informational digest of the consensus document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusSummary {
    pub valid_after: UnixMillis,
    pub consensus_method: u32,
    pub known_flags: BTreeSet<String>,
    pub client_versions: Vec<String>,
    pub server_versions: Vec<String>,
    pub params: BTreeMap<String, i64>,
    pub total_relays: usize,
    pub running_relays: usize,
}

/// Informational digest of one vote, with its known-flag differences against
/// the consensus already computed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSummary {
    pub nickname: String,
    pub known_flags: BTreeSet<String>,
    /// Flags this authority evaluates that the consensus does not assign.
    pub flags_only_in_vote: BTreeSet<String>,
    /// Flags the consensus assigns that this authority does not evaluate.
    pub flags_only_in_consensus: BTreeSet<String>,
    pub consensus_methods: BTreeSet<u32>,
    pub client_versions: Option<Vec<String>>,
    pub server_versions: Option<Vec<String>>,
    pub params: Option<BTreeMap<String, i64>>,
    pub dir_key_expires: UnixMillis,
    pub total_relays: usize,
    pub running_relays: usize,
    /// Status entries carrying a bandwidth measurement.
    pub measured_relays: usize,
}

/// Version one authority's relay advertises in the consensus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityVersion {
    pub nickname: String,
    pub fingerprint: Fingerprint,
    pub version: Option<String>,
}

/// Download latency digest for one authority, as reported by the statistics
/// collaborator. Percentiles are absent when no samples exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadStatisticsRow {
    pub authority: String,
    pub minimum_millis: Option<u64>,
    pub first_quartile_millis: Option<u64>,
    pub median_millis: Option<u64>,
    pub third_quartile_millis: Option<u64>,
    pub maximum_millis: Option<u64>,
    pub failures: u64,
}

/// The informational sections of a report, separate from the finding list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSections {
    pub consensus: Option<ConsensusSummary>,
    /// Vote digests, sorted by authority nickname.
    pub votes: Vec<VoteSummary>,
    /// Per-(authority, flag) tallies, sorted by authority then flag.
    pub flag_overlap: Vec<FlagOverlapRow>,
    /// Per-relay flag matrix, sorted by fingerprint.
    pub relay_flags: Vec<RelayFlagRow>,
    /// Authority relay versions, sorted by nickname.
    pub authority_versions: Vec<AuthorityVersion>,
    /// Download latency digests, sorted by authority.
    pub download_statistics: Vec<DownloadStatisticsRow>,
}

/// Everything one analysis run produced.
///
/// Fields are private and only readable: consumers iterate, they never
/// reorder or mutate what the engine decided.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    run_id: Uuid,
    generated_at: UnixMillis,
    findings: Vec<Finding>,
    sections: ReportSections,
}

impl AnalysisReport {
    pub fn new(
        run_id: Uuid,
        generated_at: UnixMillis,
        findings: Vec<Finding>,
        sections: ReportSections,
    ) -> Self {
        Self {
            run_id,
            generated_at,
            findings,
            sections,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn generated_at(&self) -> UnixMillis {
        self.generated_at
    }

    /// All findings, sorted by kind, then authority, then relay.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn findings_of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    pub fn has_finding(&self, kind: WarningKind) -> bool {
        self.findings.iter().any(|f| f.kind == kind)
    }

    pub fn consensus(&self) -> Option<&ConsensusSummary> {
        self.sections.consensus.as_ref()
    }

    pub fn votes(&self) -> &[VoteSummary] {
        &self.sections.votes
    }

    pub fn flag_overlap(&self) -> &[FlagOverlapRow] {
        &self.sections.flag_overlap
    }

    pub fn relay_flags(&self) -> &[RelayFlagRow] {
        &self.sections.relay_flags
    }

    pub fn authority_versions(&self) -> &[AuthorityVersion] {
        &self.sections.authority_versions
    }

    pub fn download_statistics(&self) -> &[DownloadStatisticsRow] {
        &self.sections.download_statistics
    }
}
