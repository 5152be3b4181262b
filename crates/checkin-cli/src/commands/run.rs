use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use checkin_core::config::ScannerConfig;
use checkin_core::scan::ScanDebouncer;
use checkin_core::sync::{LoadSummary, PushOutcome, SyncDriver};
use checkin_core::EventId;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::common::{format_outcome, format_stats_line, open_session, Session};
use crate::error::CliError;

const LOAD_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Interactive session: one scan payload per stdin line until EOF or Ctrl-C.
pub async fn run_session(event: &EventId, db_path: &Path) -> Result<(), CliError> {
    let config = ScannerConfig::from_env()?;
    let session = Arc::new(open_session(&config, event, db_path).await?);

    let summary = load_with_retry(&session).await?;
    let view = session.view();
    println!("{} ({} attendees)", view.details.name, summary.attendees);
    println!("{}", view.stats);

    let driver = SyncDriver::new(
        Arc::clone(&session),
        config.push_interval,
        config.pull_interval,
    );
    let timers = driver.start();

    let mut debouncer = ScanDebouncer::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let payload = line.trim();
                if payload.is_empty() || !debouncer.accept(payload, Instant::now()) {
                    continue;
                }
                match driver.handle_scan(payload).await {
                    Ok(outcome) => println!("{}", format_outcome(&outcome)),
                    Err(error) => println!("{error}"),
                }
                println!("{}", format_stats_line(&session.view().stats));
            }
            _ = &mut ctrl_c => break,
        }
    }

    timers.shutdown().await;
    flush(&session).await;
    Ok(())
}

async fn load_with_retry(session: &Session) -> Result<LoadSummary, CliError> {
    loop {
        match session.initial_load().await {
            Ok(summary) => return Ok(summary),
            Err(error) if !error.is_terminal() => {
                eprintln!("{error}. Retrying in {}s...", LOAD_RETRY_DELAY.as_secs());
                tokio::time::sleep(LOAD_RETRY_DELAY).await;
            }
            Err(error) => return Err(error.into()),
        }
    }
}

async fn flush(session: &Session) {
    match session.push().await {
        Ok(PushOutcome::Uploaded(count)) => println!("Uploaded {count} check-ins"),
        Ok(_) => {}
        Err(error) => {
            let pending = session.view().pending_uploads;
            eprintln!("{error}. {pending} check-ins stay queued for the next session.");
        }
    }
}
