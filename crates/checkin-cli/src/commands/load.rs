use std::path::Path;

use checkin_core::config::ScannerConfig;
use checkin_core::EventId;

use crate::commands::common::open_session;
use crate::error::CliError;

pub async fn run_load(event: &EventId, db_path: &Path) -> Result<(), CliError> {
    let config = ScannerConfig::from_env()?;
    let session = open_session(&config, event, db_path).await?;
    let summary = session.initial_load().await?;

    let view = session.view();
    println!("{}", view.details.name);
    if !view.details.date.is_empty() {
        println!("{}", view.details.date);
    }
    println!("Loaded {} attendees", summary.attendees);
    if summary.restored_check_ins > 0 {
        println!(
            "Re-applied {} check-ins waiting for upload",
            summary.restored_check_ins
        );
    }
    println!("{}", view.stats);
    Ok(())
}
