//! Offline-hours / offline-days windows, derived from UTC block time.

use crate::approvals::types::AltTimeChecks;
use crate::constants::{EPOCH_WEEKDAY, MS_PER_DAY, MS_PER_HOUR};
use crate::errors::EngineError;
use crate::ranges;

pub fn utc_hour(now_ms: u64) -> u64 {
    (now_ms / MS_PER_HOUR) % 24
}

/// Sunday = 0.
pub fn utc_weekday(now_ms: u64) -> u64 {
    (now_ms / MS_PER_DAY + EPOCH_WEEKDAY) % 7
}

pub fn check_alt_time(checks: &AltTimeChecks, now_ms: u64) -> Result<(), EngineError> {
    let hour = utc_hour(now_ms);
    if ranges::search(hour, &checks.offline_hours) {
        return Err(EngineError::DisallowedTransfer(format!(
            "current UTC hour {} falls within offline hours",
            hour
        )));
    }
    let day = utc_weekday(now_ms);
    if ranges::search(day, &checks.offline_days) {
        return Err(EngineError::DisallowedTransfer(format!(
            "current UTC day {} falls within offline days",
            day
        )));
    }
    Ok(())
}
