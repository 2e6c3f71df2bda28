//! # Consensus-Health Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Shared document builders
//! └── integration/      # End-to-end engine runs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ch-tests
//!
//! # By category
//! cargo test -p ch-tests integration::
//!
//! # Benchmarks
//! cargo bench -p ch-tests
//! ```

pub mod fixtures;
pub mod integration;
