use std::path::Path;

use checkin_core::EventId;

use crate::commands::common::{format_status_lines, open_cache, roster_stats, status_report};
use crate::error::CliError;

pub async fn run_status(as_json: bool, event: &EventId, db_path: &Path) -> Result<(), CliError> {
    let cache = open_cache(event, db_path).await?;
    let roster = cache.load_roster().await?.unwrap_or_default();
    let details = cache.load_details().await?.unwrap_or_default();
    let totals = cache.load_totals().await?;
    let my_check_ins = cache.load_my_check_ins().await?;
    let pending = cache.load_pending().await?;
    let watermark = cache.load_watermark().await?;

    let report = status_report(
        event,
        &details,
        roster_stats(&roster, totals, my_check_ins),
        pending.len(),
        watermark,
    );

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_status_lines(&report) {
            println!("{line}");
        }
    }
    Ok(())
}
