//! # Shared Test Fixtures
//!
//! Document builders for integration tests and benchmarks. The network they
//! describe is small but complete: three authorities, two ordinary relays,
//! and votes that agree with the consensus on everything, so each test can
//! break exactly the one thing it is about.

use std::sync::Arc;

use ch_analysis::{AnalysisConfig, AnalysisService, FixedTimeSource, InMemoryDownloadStatistics};
use shared_types::{
    ConsensusDocument, DocumentBatch, FetchOutcome, Fingerprint, NetworkDocument, StatusEntry,
    VoteDocument, FLAG_AUTHORITY, FLAG_RUNNING,
};

/// Fixed "now" every integration run shares.
pub const NOW: u64 = 1_700_000_000_000;

pub const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1_000;

/// The fixture network's authorities with their identity fingerprints.
pub const AUTHORITIES: [(&str, &str); 3] = [
    ("gabelmoo", "F2044413DAC2E02E3D6BCF4735A19BCA1DE97281"),
    ("moria1", "D586D18309DED4CD6D57C18FDB97EFA96D330566"),
    ("tor26", "14C131DFC5C6F93646BE72FA1401C02A8DF2E8B4"),
];

pub const RELAY_ALPHA: &str = "A1B2C3D4E5F607182930A1B2C3D4E5F607182930";
pub const RELAY_BETA: &str = "BBBB5555CCCC9999DDDD0000EEEE1111FFFF2222";

pub const KNOWN_FLAGS: [&str; 7] = [
    "Authority",
    "Exit",
    "Fast",
    "Guard",
    "Running",
    "Stable",
    "Valid",
];

pub const RECOMMENDED_VERSIONS: [&str; 2] = ["0.4.7.16", "0.4.8.10"];

/// Route engine logs into the test harness. Safe to call in every test.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fingerprint(hex: &str) -> Fingerprint {
    Fingerprint::new(hex).expect("fixture fingerprints are valid hex")
}

pub fn relay_entry(hex: &str, nickname: &str, flags: &[&str]) -> StatusEntry {
    StatusEntry::new(fingerprint(hex), nickname).with_flags(flags.iter().copied())
}

/// A consensus entry for one authority's own relay.
pub fn authority_entry(nickname: &str, hex: &str) -> StatusEntry {
    StatusEntry::new(fingerprint(hex), nickname)
        .with_flags([FLAG_AUTHORITY, FLAG_RUNNING, "Valid"])
        .with_version("0.4.8.10")
}

fn authority_entries() -> Vec<StatusEntry> {
    AUTHORITIES
        .iter()
        .map(|(nickname, hex)| authority_entry(nickname, hex))
        .collect()
}

/// The fixture consensus: five relays, ten minutes old, roster lines intact.
pub fn consensus() -> ConsensusDocument {
    ConsensusDocument::builder(NOW - 10 * 60 * 1_000, 28)
        .known_flags(KNOWN_FLAGS)
        .client_versions(RECOMMENDED_VERSIONS)
        .server_versions(RECOMMENDED_VERSIONS)
        .param("circwindow", 1000)
        .param("cbtquantile", 80)
        .status_entries(authority_entries())
        .status_entry(relay_entry(
            RELAY_ALPHA,
            "alpharelay",
            &["Exit", "Fast", "Guard", "Running", "Stable", "Valid"],
        ))
        .status_entry(relay_entry(RELAY_BETA, "betarelay", &["Valid"]))
        .voting_authorities(AUTHORITIES.iter().map(|(nickname, _)| *nickname))
        .signing_authorities(AUTHORITIES.iter().map(|(nickname, _)| *nickname))
        .build()
        .expect("fixture consensus is well formed")
}

/// A vote that agrees with [`consensus`] on every axis, with bandwidth
/// measurements on every Running relay.
pub fn agreeing_vote(nickname: &str) -> VoteDocument {
    agreeing_vote_with_expiry(nickname, NOW + 180 * MILLIS_PER_DAY)
}

/// Same as [`agreeing_vote`] with the signing certificate horizon pinned.
pub fn agreeing_vote_with_expiry(nickname: &str, dir_key_expires: u64) -> VoteDocument {
    let mut builder = VoteDocument::builder(nickname, dir_key_expires)
        .known_flags(KNOWN_FLAGS)
        .consensus_methods([26, 27, 28])
        .client_versions(RECOMMENDED_VERSIONS)
        .server_versions(RECOMMENDED_VERSIONS)
        .param("circwindow", 1000)
        .param("cbtquantile", 80);
    for entry in authority_entries() {
        builder = builder.status_entry(entry.with_measured_bandwidth(9_000));
    }
    builder
        .status_entry(
            relay_entry(
                RELAY_ALPHA,
                "alpharelay",
                &["Exit", "Fast", "Guard", "Running", "Stable", "Valid"],
            )
            .with_measured_bandwidth(25_000),
        )
        .status_entry(relay_entry(RELAY_BETA, "betarelay", &["Valid"]))
        .build()
        .expect("fixture vote is well formed")
}

/// The consensus plus one agreeing vote per authority, all delivered in time.
pub fn healthy_batch() -> DocumentBatch {
    let mut batch = DocumentBatch::new();
    batch.push_document(NetworkDocument::Consensus(consensus()));
    for (nickname, _) in AUTHORITIES {
        batch.push_document(NetworkDocument::Vote(agreeing_vote(nickname)));
        batch.record_fetch(nickname, FetchOutcome::Delivered);
    }
    batch
}

pub fn statistics() -> Arc<InMemoryDownloadStatistics> {
    Arc::new(InMemoryDownloadStatistics::new())
}

/// A service with the default configuration and a clock pinned to [`NOW`].
pub fn service() -> AnalysisService<InMemoryDownloadStatistics> {
    service_with(AnalysisConfig::default(), statistics())
}

pub fn service_with(
    config: AnalysisConfig,
    statistics: Arc<InMemoryDownloadStatistics>,
) -> AnalysisService<InMemoryDownloadStatistics> {
    AnalysisService::new(config, statistics).with_time_source(Box::new(FixedTimeSource::new(NOW)))
}

/// The default configuration plus the fixture authorities as the expected
/// roster.
pub fn roster_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    for (nickname, hex) in AUTHORITIES {
        config
            .expected_authorities
            .insert(nickname.to_string(), fingerprint(hex));
    }
    config
}
