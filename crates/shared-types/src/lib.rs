//! # Shared Types Crate
//!
//! This crate contains the network document model, the warning taxonomy, and
//! the analysis report types shared between the analysis engine and its
//! consumers.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Immutable Documents**: Consensuses and votes are validated at
//!   construction and never mutated afterwards.
//! - **Closed Taxonomy**: Every finding carries one of the fixed
//!   [`WarningKind`] values; there is no free-form warning channel.

pub mod documents;
pub mod errors;
pub mod findings;
pub mod report;

pub use documents::*;
pub use errors::*;
pub use findings::*;
pub use report::*;
