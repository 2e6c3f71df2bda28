//! # Error Types
//!
//! Defines errors raised while constructing network documents.

use thiserror::Error;

/// Errors that can occur while assembling a consensus or vote document.
///
/// These are construction-time invariant violations. Malformed remote input
/// is expected and reported loudly here; the analysis engine itself never
/// sees a document that failed construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// Two status entries in the same document share a fingerprint.
    #[error("Duplicate status entry: fingerprint {fingerprint} listed twice")]
    DuplicateFingerprint { fingerprint: String },

    /// A fingerprint was empty.
    #[error("Fingerprint must not be empty")]
    EmptyFingerprint,

    /// A fingerprint contained non-hexadecimal characters.
    #[error("Fingerprint is not hexadecimal: {fingerprint}")]
    InvalidFingerprint { fingerprint: String },

    /// A vote carried no authority nickname.
    #[error("Authority nickname must not be empty")]
    EmptyNickname,
}
