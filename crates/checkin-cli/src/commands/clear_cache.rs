use std::path::Path;

use checkin_core::EventId;

use crate::commands::common::open_cache;
use crate::error::CliError;

pub async fn run_clear_cache(event: &EventId, db_path: &Path) -> Result<(), CliError> {
    let cache = open_cache(event, db_path).await?;
    let pending = cache.load_pending().await?;
    if !pending.is_empty() {
        tracing::warn!(
            "Discarding {} check-ins that were never uploaded",
            pending.len()
        );
    }

    cache.clear().await?;
    println!("Cleared cached data for event {event}");
    Ok(())
}
