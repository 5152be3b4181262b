use std::path::Path;

use checkin_core::config::ScannerConfig;
use checkin_core::sync::{PullOutcome, PushOutcome};
use checkin_core::EventId;

use crate::commands::common::open_session;
use crate::error::CliError;

pub async fn run_push(event: &EventId, db_path: &Path) -> Result<(), CliError> {
    let config = ScannerConfig::from_env()?;
    let session = open_session(&config, event, db_path).await?;

    match session.push().await? {
        PushOutcome::Uploaded(count) => println!("Uploaded {count} check-ins"),
        PushOutcome::Idle | PushOutcome::InFlight => println!("Nothing to upload"),
    }
    Ok(())
}

pub async fn run_pull(event: &EventId, db_path: &Path) -> Result<(), CliError> {
    let config = ScannerConfig::from_env()?;
    let session = open_session(&config, event, db_path).await?;
    if !session.resume().await {
        return Err(CliError::NotLoaded(event.clone()));
    }

    if let PullOutcome::Merged(report) = session.pull_updates().await? {
        println!(
            "Roster updated: {} new, {} changed",
            report.inserted, report.updated
        );
    }
    println!("{}", session.view().stats);
    Ok(())
}
