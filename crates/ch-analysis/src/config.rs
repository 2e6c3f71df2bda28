//! # Analysis Configuration
//!
//! Tunables for one engine instance. The defaults mirror the thresholds the
//! directory protocol has used in production for years; overriding them is
//! mostly a test-network concern.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shared_types::Fingerprint;

use crate::error::ConfigError;

pub const MILLIS_PER_HOUR: u64 = 60 * 60 * 1_000;
pub const MILLIS_PER_DAY: u64 = 24 * MILLIS_PER_HOUR;

/// Consensus parameters every production authority is expected to know.
///
/// Keys outside this list and outside the bandwidth scanner namespace are
/// treated as unknown.
pub const DEFAULT_KNOWN_PARAMS: [&str; 19] = [
    "circwindow",
    "CircuitPriorityHalflifeMsec",
    "refuseunknownexits",
    "cbtdisabled",
    "cbtnummodes",
    "cbtrecentcount",
    "cbtmaxtimeouts",
    "cbtmincircs",
    "cbtquantile",
    "cbtclosequantile",
    "cbttestfreq",
    "cbtmintimeout",
    "cbtinitialtimeout",
    "perconnbwburst",
    "perconnbwrate",
    "UseOptimisticData",
    "pb_disablepct",
    "UseNTorHandshake",
    "NumNTorsPerTAP",
];

/// Horizons for staging certificate expiry warnings, nearest first.
///
/// A vote whose signing certificate expires inside a band gets the warning
/// for the nearest band it falls into, and only that one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyExpiryBands {
    pub two_weeks_millis: u64,
    pub two_months_millis: u64,
    pub three_months_millis: u64,
}

impl Default for KeyExpiryBands {
    fn default() -> Self {
        Self {
            two_weeks_millis: 14 * MILLIS_PER_DAY,
            two_months_millis: 60 * MILLIS_PER_DAY,
            three_months_millis: 90 * MILLIS_PER_DAY,
        }
    }
}

/// Tunables for one analysis engine instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// How old a consensus may get before it is reported as not fresh.
    pub freshness_window_millis: u64,
    /// Signing certificate expiry horizons.
    pub expiry_bands: KeyExpiryBands,
    /// Parameter keys votes may set without being flagged as unknown.
    pub known_params: BTreeSet<String>,
    /// Authorities expected to vote, with their identity fingerprints.
    /// An empty roster keeps the per-authority roster checks silent.
    pub expected_authorities: BTreeMap<String, Fingerprint>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            freshness_window_millis: MILLIS_PER_HOUR,
            expiry_bands: KeyExpiryBands::default(),
            known_params: DEFAULT_KNOWN_PARAMS.iter().map(|p| p.to_string()).collect(),
            expected_authorities: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Checks the internal consistency rules a config must satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.freshness_window_millis == 0 {
            return Err(ConfigError::ZeroFreshnessWindow);
        }

        let bands = &self.expiry_bands;
        if bands.two_weeks_millis > bands.two_months_millis
            || bands.two_months_millis > bands.three_months_millis
        {
            return Err(ConfigError::UnorderedExpiryBands);
        }

        let mut seen: BTreeMap<&Fingerprint, &str> = BTreeMap::new();
        for (nickname, fingerprint) in &self.expected_authorities {
            if let Some(first) = seen.insert(fingerprint, nickname) {
                return Err(ConfigError::DuplicateRosterFingerprint {
                    first: first.to_string(),
                    second: nickname.clone(),
                    fingerprint: fingerprint.to_string(),
                });
            }
        }

        Ok(())
    }
}
