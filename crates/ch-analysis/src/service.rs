//! # Analysis Service
//!
//! Application service layer that implements the `ConsensusHealthApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`ConsensusHealthApi`)
//! - Uses the outbound ports (`DownloadStatistics`, `TimeSource`)
//! - Delegates all comparison logic to the domain layer

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use shared_types::{AnalysisReport, DocumentBatch, DownloadStatisticsRow};

use crate::config::AnalysisConfig;
use crate::domain::{ingest, report};
use crate::ports::inbound::ConsensusHealthApi;
use crate::ports::outbound::{DownloadStatistics, SystemTimeSource, TimeSource};

/// Consensus-Health Analysis Service.
///
/// One instance holds the engine configuration and its two collaborators;
/// every `analyze` call is an independent run. The service is thread-safe
/// and can be shared across threads via `Arc`.
pub struct AnalysisService<S: DownloadStatistics> {
    config: AnalysisConfig,
    statistics: Arc<S>,
    time_source: Box<dyn TimeSource>,
}

impl<S: DownloadStatistics> AnalysisService<S> {
    /// Create a service reading the wall clock.
    pub fn new(config: AnalysisConfig, statistics: Arc<S>) -> Self {
        Self {
            config,
            statistics,
            time_source: Box::new(SystemTimeSource),
        }
    }

    /// Replace the clock, mainly for tests and replayed runs.
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    fn download_statistics_rows(&self) -> Vec<DownloadStatisticsRow> {
        self.statistics
            .known_authorities()
            .into_iter()
            .map(|authority| DownloadStatisticsRow {
                minimum_millis: self.statistics.percentile(&authority, 0),
                first_quartile_millis: self.statistics.percentile(&authority, 25),
                median_millis: self.statistics.percentile(&authority, 50),
                third_quartile_millis: self.statistics.percentile(&authority, 75),
                maximum_millis: self.statistics.percentile(&authority, 100),
                failures: self.statistics.failure_count(&authority),
                authority,
            })
            .collect()
    }
}

impl<S: DownloadStatistics> ConsensusHealthApi for AnalysisService<S> {
    fn analyze(&self, batch: DocumentBatch) -> AnalysisReport {
        let run_id = Uuid::new_v4();
        let now = self.time_source.now_millis();

        let inputs = ingest::ingest(batch);
        info!(
            %run_id,
            consensus_present = inputs.consensus.is_some(),
            votes = inputs.votes.len(),
            timed_out = inputs.timed_out_authorities.len(),
            "starting analysis run"
        );

        let statistics = self.download_statistics_rows();
        let report = report::build_report(run_id, now, &inputs, &self.config, statistics);

        info!(
            %run_id,
            findings = report.findings().len(),
            "analysis run complete"
        );
        report
    }
}
