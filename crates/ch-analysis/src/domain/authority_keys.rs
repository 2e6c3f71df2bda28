//! # Signing Certificate Expiry
//!
//! Each vote names when its signing certificate expires. Expiries are staged
//! into three bands so renderers can escalate: within two weeks, within two
//! months, within three months. Only the nearest matching band is reported.
//! How often each band is re-announced is a presentation concern and stays
//! outside this engine.

use shared_types::{Finding, UnixMillis, VoteDocument};

use crate::config::KeyExpiryBands;

/// Which expiry horizon a certificate falls into, nearest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpiryBand {
    TwoWeeks,
    TwoMonths,
    ThreeMonths,
}

/// The nearest band an expiry falls into, or `None` when the certificate
/// outlives all horizons. Band boundaries are exclusive: expiring exactly at
/// a horizon does not trip it.
pub fn expiry_band(
    expires: UnixMillis,
    now: UnixMillis,
    bands: &KeyExpiryBands,
) -> Option<ExpiryBand> {
    if expires < now.saturating_add(bands.two_weeks_millis) {
        Some(ExpiryBand::TwoWeeks)
    } else if expires < now.saturating_add(bands.two_months_millis) {
        Some(ExpiryBand::TwoMonths)
    } else if expires < now.saturating_add(bands.three_months_millis) {
        Some(ExpiryBand::ThreeMonths)
    } else {
        None
    }
}

/// One finding for the nearest band a vote's certificate expiry falls into.
pub fn check_authority_key_expiry(
    vote: &VoteDocument,
    now: UnixMillis,
    bands: &KeyExpiryBands,
) -> Option<Finding> {
    let expires = vote.dir_key_expires();
    let finding = match expiry_band(expires, now, bands)? {
        ExpiryBand::TwoWeeks => {
            Finding::certificate_expires_in_two_weeks(vote.nickname(), expires, now)
        }
        ExpiryBand::TwoMonths => {
            Finding::certificate_expires_in_two_months(vote.nickname(), expires, now)
        }
        ExpiryBand::ThreeMonths => {
            Finding::certificate_expires_in_three_months(vote.nickname(), expires, now)
        }
    };
    Some(finding)
}
