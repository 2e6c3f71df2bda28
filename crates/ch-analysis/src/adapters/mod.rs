//! # Adapters Module
//!
//! In-process implementations of the outbound ports.

pub mod clock;
pub mod statistics;
