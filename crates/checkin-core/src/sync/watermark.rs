//! Pull watermark arithmetic

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Watermark for a sync that started at `started_at`.
///
/// The skew keeps records written around the same instant inside the next
/// incremental window.
pub fn next_watermark(started_at: DateTime<Utc>, skew: Duration) -> DateTime<Utc> {
    let skew = TimeDelta::from_std(skew).unwrap_or(TimeDelta::MAX);
    started_at
        .checked_sub_signed(skew)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
