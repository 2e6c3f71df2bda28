//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use shared_types::{AnalysisReport, DocumentBatch};

/// Primary consensus-health analysis API.
///
/// This is the main entry point for analysis runs. Implementations must be
/// thread-safe (`Send + Sync`). One call consumes one batch of fetched
/// documents and produces one complete report; runs share no state.
pub trait ConsensusHealthApi: Send + Sync {
    /// Analyze one batch of documents and fetch outcomes.
    ///
    /// Degraded input never fails the run: a batch without a consensus or
    /// without votes produces a report whose findings say exactly that.
    fn analyze(&self, batch: DocumentBatch) -> AnalysisReport;
}
