//! # Discrepancy Analysis Engine
//!
//! Compares one network-status consensus against the per-authority votes it
//! was computed from and reports every disagreement, staleness condition and
//! policy violation as a typed finding under a closed warning taxonomy.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Pure comparison logic, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Adapters Layer** (`adapters/`): In-process port implementations
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Determinism
//!
//! A run is a pure function of its inputs, the configuration and the clock.
//! Internal parallelism never leaks into the output: findings and report
//! sections come out in one defined order.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::clock::FixedTimeSource;
pub use adapters::statistics::InMemoryDownloadStatistics;
pub use config::{AnalysisConfig, KeyExpiryBands, DEFAULT_KNOWN_PARAMS};
pub use error::ConfigError;
pub use ports::inbound::ConsensusHealthApi;
pub use ports::outbound::{DownloadStatistics, SystemTimeSource, TimeSource};
pub use service::AnalysisService;
