//! # Findings
//!
//! The warning taxonomy and the `Finding` output unit. A finding pairs a
//! warning kind with the scope it concerns and the data a renderer needs to
//! explain it. Findings are append-only per analysis run; none is mutated
//! after creation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::documents::{Fingerprint, UnixMillis};

/// The closed set of warning kinds the engine can emit.
///
/// Declaration order is report order: findings sort by kind first, and the
/// derived `Ord` follows this listing.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// No consensus is known that could be checked.
    NoConsensusKnown,
    /// An authority did not return a consensus within the fetch deadline.
    ConsensusDownloadTimeout,
    /// The consensus is older than the freshness window.
    ConsensusNotFresh,
    /// An authority does not support the method the consensus was built with.
    ConsensusMethodNotSupported,
    /// An authority recommends different client versions than the consensus.
    DifferingRecommendedClientVersions,
    /// An authority recommends different server versions than the consensus.
    DifferingRecommendedServerVersions,
    /// An authority voted for consensus parameters outside the known set.
    UnknownConsensusParams,
    /// An authority voted for parameters conflicting with the consensus.
    ConflictingConsensusParams,
    /// An authority's signing certificate expires within three months.
    #[serde(rename = "certificate-expires-3-months")]
    CertificateExpiresInThreeMonths,
    /// An authority's signing certificate expires within two months.
    #[serde(rename = "certificate-expires-2-months")]
    CertificateExpiresInTwoMonths,
    /// An authority's signing certificate expires within two weeks.
    #[serde(rename = "certificate-expires-2-weeks")]
    CertificateExpiresInTwoWeeks,
    /// One or more expected votes are missing.
    VotesMissing,
    /// No authority is reporting bandwidth scanner results.
    BandwidthScannerResultsMissing,
    /// The consensus is missing votes from authorities that did vote.
    ConsensusMissingVotes,
    /// The consensus is missing signatures from voting authorities.
    ConsensusMissingSignatures,
    /// An expected authority is missing from the consensus.
    MissingAuthorities,
    /// An authority's relay carries a different identity key than expected.
    UnexpectedFingerprints,
    /// An authority's relay runs an unrecommended version.
    UnrecommendedVersions,
}

impl WarningKind {
    /// Every kind, in taxonomy order.
    pub const ALL: [WarningKind; 18] = [
        WarningKind::NoConsensusKnown,
        WarningKind::ConsensusDownloadTimeout,
        WarningKind::ConsensusNotFresh,
        WarningKind::ConsensusMethodNotSupported,
        WarningKind::DifferingRecommendedClientVersions,
        WarningKind::DifferingRecommendedServerVersions,
        WarningKind::UnknownConsensusParams,
        WarningKind::ConflictingConsensusParams,
        WarningKind::CertificateExpiresInThreeMonths,
        WarningKind::CertificateExpiresInTwoMonths,
        WarningKind::CertificateExpiresInTwoWeeks,
        WarningKind::VotesMissing,
        WarningKind::BandwidthScannerResultsMissing,
        WarningKind::ConsensusMissingVotes,
        WarningKind::ConsensusMissingSignatures,
        WarningKind::MissingAuthorities,
        WarningKind::UnexpectedFingerprints,
        WarningKind::UnrecommendedVersions,
    ];

    /// Stable kebab-case label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::NoConsensusKnown => "no-consensus-known",
            Self::ConsensusDownloadTimeout => "consensus-download-timeout",
            Self::ConsensusNotFresh => "consensus-not-fresh",
            Self::ConsensusMethodNotSupported => "consensus-method-not-supported",
            Self::DifferingRecommendedClientVersions => "differing-recommended-client-versions",
            Self::DifferingRecommendedServerVersions => "differing-recommended-server-versions",
            Self::UnknownConsensusParams => "unknown-consensus-params",
            Self::ConflictingConsensusParams => "conflicting-consensus-params",
            Self::CertificateExpiresInThreeMonths => "certificate-expires-3-months",
            Self::CertificateExpiresInTwoMonths => "certificate-expires-2-months",
            Self::CertificateExpiresInTwoWeeks => "certificate-expires-2-weeks",
            Self::VotesMissing => "votes-missing",
            Self::BandwidthScannerResultsMissing => "bandwidth-scanner-results-missing",
            Self::ConsensusMissingVotes => "consensus-missing-votes",
            Self::ConsensusMissingSignatures => "consensus-missing-signatures",
            Self::MissingAuthorities => "missing-authorities",
            Self::UnexpectedFingerprints => "unexpected-fingerprints",
            Self::UnrecommendedVersions => "unrecommended-versions",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a finding concerns. Both fields absent means network-wide.
///
/// The derived `Ord` sorts authority before relay, which is the tie-break
/// order findings are reported in.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Scope {
    /// Authority nickname, when the finding concerns a single authority.
    pub authority: Option<String>,
    /// Relay identity, when the finding concerns a single relay.
    pub relay: Option<Fingerprint>,
}

impl Scope {
    /// A finding about the network as a whole.
    pub fn network() -> Self {
        Self::default()
    }

    /// A finding about one authority.
    pub fn authority(nickname: impl Into<String>) -> Self {
        Self {
            authority: Some(nickname.into()),
            relay: None,
        }
    }

    /// A finding about one relay operated by one authority.
    pub fn authority_relay(nickname: impl Into<String>, relay: Fingerprint) -> Self {
        Self {
            authority: Some(nickname.into()),
            relay: Some(relay),
        }
    }
}

/// Structured payload a renderer needs to explain a finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingDetail {
    /// The kind and scope say everything.
    None,
    /// How old the consensus was when checked.
    ConsensusAge {
        valid_after: UnixMillis,
        checked_at: UnixMillis,
    },
    /// The method the consensus uses next to the methods the vote supports.
    UnsupportedMethod {
        consensus_method: u32,
        supported_methods: Vec<u32>,
    },
    /// Version lists that should have matched but did not.
    VersionMismatch {
        vote_versions: Vec<String>,
        consensus_versions: Vec<String>,
    },
    /// Parameters outside the known set, with the values voted for.
    UnknownParams { params: BTreeMap<String, i64> },
    /// A vote's full parameter list next to the keys that clash.
    ConflictingParams {
        vote_params: BTreeMap<String, i64>,
        offending_keys: Vec<String>,
    },
    /// When a signing certificate runs out.
    KeyExpiry {
        expires: UnixMillis,
        checked_at: UnixMillis,
    },
    /// The identity key found where a different one was expected.
    FingerprintMismatch {
        expected: Fingerprint,
        actual: Fingerprint,
    },
    /// A version outside the recommended list.
    UnrecommendedVersion {
        version: String,
        recommended_versions: Vec<String>,
    },
}

/// One detected discrepancy or observation.
///
/// Constructed only through the per-kind constructors below, which keep kind,
/// scope shape, and detail shape consistent with each other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: WarningKind,
    pub scope: Scope,
    pub detail: FindingDetail,
}

impl Finding {
    pub fn no_consensus_known() -> Self {
        Self {
            kind: WarningKind::NoConsensusKnown,
            scope: Scope::network(),
            detail: FindingDetail::None,
        }
    }

    pub fn consensus_download_timeout(authority: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ConsensusDownloadTimeout,
            scope: Scope::authority(authority),
            detail: FindingDetail::None,
        }
    }

    pub fn consensus_not_fresh(valid_after: UnixMillis, checked_at: UnixMillis) -> Self {
        Self {
            kind: WarningKind::ConsensusNotFresh,
            scope: Scope::network(),
            detail: FindingDetail::ConsensusAge {
                valid_after,
                checked_at,
            },
        }
    }

    pub fn consensus_method_not_supported(
        authority: impl Into<String>,
        consensus_method: u32,
        supported_methods: &BTreeSet<u32>,
    ) -> Self {
        Self {
            kind: WarningKind::ConsensusMethodNotSupported,
            scope: Scope::authority(authority),
            detail: FindingDetail::UnsupportedMethod {
                consensus_method,
                supported_methods: supported_methods.iter().copied().collect(),
            },
        }
    }

    pub fn differing_client_versions(
        authority: impl Into<String>,
        vote_versions: &[String],
        consensus_versions: &[String],
    ) -> Self {
        Self {
            kind: WarningKind::DifferingRecommendedClientVersions,
            scope: Scope::authority(authority),
            detail: FindingDetail::VersionMismatch {
                vote_versions: vote_versions.to_vec(),
                consensus_versions: consensus_versions.to_vec(),
            },
        }
    }

    pub fn differing_server_versions(
        authority: impl Into<String>,
        vote_versions: &[String],
        consensus_versions: &[String],
    ) -> Self {
        Self {
            kind: WarningKind::DifferingRecommendedServerVersions,
            scope: Scope::authority(authority),
            detail: FindingDetail::VersionMismatch {
                vote_versions: vote_versions.to_vec(),
                consensus_versions: consensus_versions.to_vec(),
            },
        }
    }

    pub fn unknown_consensus_params(
        authority: impl Into<String>,
        params: BTreeMap<String, i64>,
    ) -> Self {
        Self {
            kind: WarningKind::UnknownConsensusParams,
            scope: Scope::authority(authority),
            detail: FindingDetail::UnknownParams { params },
        }
    }

    pub fn conflicting_consensus_params(
        authority: impl Into<String>,
        vote_params: BTreeMap<String, i64>,
        offending_keys: Vec<String>,
    ) -> Self {
        Self {
            kind: WarningKind::ConflictingConsensusParams,
            scope: Scope::authority(authority),
            detail: FindingDetail::ConflictingParams {
                vote_params,
                offending_keys,
            },
        }
    }

    pub fn certificate_expires_in_three_months(
        authority: impl Into<String>,
        expires: UnixMillis,
        checked_at: UnixMillis,
    ) -> Self {
        Self {
            kind: WarningKind::CertificateExpiresInThreeMonths,
            scope: Scope::authority(authority),
            detail: FindingDetail::KeyExpiry {
                expires,
                checked_at,
            },
        }
    }

    pub fn certificate_expires_in_two_months(
        authority: impl Into<String>,
        expires: UnixMillis,
        checked_at: UnixMillis,
    ) -> Self {
        Self {
            kind: WarningKind::CertificateExpiresInTwoMonths,
            scope: Scope::authority(authority),
            detail: FindingDetail::KeyExpiry {
                expires,
                checked_at,
            },
        }
    }

    pub fn certificate_expires_in_two_weeks(
        authority: impl Into<String>,
        expires: UnixMillis,
        checked_at: UnixMillis,
    ) -> Self {
        Self {
            kind: WarningKind::CertificateExpiresInTwoWeeks,
            scope: Scope::authority(authority),
            detail: FindingDetail::KeyExpiry {
                expires,
                checked_at,
            },
        }
    }

    /// No votes arrived at all and no roster says which were expected.
    pub fn votes_missing_network_wide() -> Self {
        Self {
            kind: WarningKind::VotesMissing,
            scope: Scope::network(),
            detail: FindingDetail::None,
        }
    }

    /// A specific expected authority's vote is missing.
    pub fn votes_missing(authority: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::VotesMissing,
            scope: Scope::authority(authority),
            detail: FindingDetail::None,
        }
    }

    pub fn bandwidth_scanner_results_missing() -> Self {
        Self {
            kind: WarningKind::BandwidthScannerResultsMissing,
            scope: Scope::network(),
            detail: FindingDetail::None,
        }
    }

    pub fn consensus_missing_votes(authority: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ConsensusMissingVotes,
            scope: Scope::authority(authority),
            detail: FindingDetail::None,
        }
    }

    pub fn consensus_missing_signatures(authority: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ConsensusMissingSignatures,
            scope: Scope::authority(authority),
            detail: FindingDetail::None,
        }
    }

    pub fn missing_authority(authority: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::MissingAuthorities,
            scope: Scope::authority(authority),
            detail: FindingDetail::None,
        }
    }

    pub fn unexpected_fingerprint(
        authority: impl Into<String>,
        expected: Fingerprint,
        actual: Fingerprint,
    ) -> Self {
        Self {
            kind: WarningKind::UnexpectedFingerprints,
            scope: Scope::authority(authority),
            detail: FindingDetail::FingerprintMismatch { expected, actual },
        }
    }

    pub fn unrecommended_version(
        authority: impl Into<String>,
        relay: Fingerprint,
        version: impl Into<String>,
        recommended_versions: &[String],
    ) -> Self {
        Self {
            kind: WarningKind::UnrecommendedVersions,
            scope: Scope::authority_relay(authority, relay),
            detail: FindingDetail::UnrecommendedVersion {
                version: version.into(),
                recommended_versions: recommended_versions.to_vec(),
            },
        }
    }
}
