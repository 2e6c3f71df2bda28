//! # Engine Errors
//!
//! Errors the engine surfaces to its operator. Malformed remote documents
//! never show up here; those are handled as data during analysis.

use thiserror::Error;

/// Errors raised when an [`AnalysisConfig`](crate::config::AnalysisConfig)
/// fails validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The freshness window was zero, which would flag every consensus.
    #[error("Freshness window must be greater than zero")]
    ZeroFreshnessWindow,

    /// The certificate expiry bands were not ordered nearest-first.
    #[error("Key expiry bands must satisfy: two weeks <= two months <= three months")]
    UnorderedExpiryBands,

    /// Two expected authorities claim the same identity key.
    #[error("Authorities {first} and {second} share fingerprint {fingerprint}")]
    DuplicateRosterFingerprint {
        first: String,
        second: String,
        fingerprint: String,
    },
}
