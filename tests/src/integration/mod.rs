//! # Integration Tests
//!
//! Whole-engine runs through the public `ConsensusHealthApi`, from document
//! batch to finished report.

pub mod degraded_inputs;
