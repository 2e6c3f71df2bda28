//! # Domain Layer
//!
//! Pure comparison and aggregation logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod authority_keys;
pub mod counts;
pub mod field_checks;
pub mod flag_overlap;
pub mod ingest;
pub mod params;
pub mod report;
pub mod roster;
pub mod versions;
