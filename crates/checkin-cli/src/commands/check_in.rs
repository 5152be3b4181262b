use std::path::Path;

use checkin_core::sync::CheckInOutcome;
use checkin_core::{EventId, ParticipantId};

use crate::commands::common::{
    format_outcome, format_stats_line, push_after_check_in, ready_session, Session,
};
use crate::error::CliError;

pub async fn run_check_in(id: i64, event: &EventId, db_path: &Path) -> Result<(), CliError> {
    let session = ready_session(event, db_path).await?;
    let outcome = session.check_in(ParticipantId::new(id)).await?;
    report_outcome(&session, &outcome).await;
    Ok(())
}

pub async fn run_scan(payload: &str, event: &EventId, db_path: &Path) -> Result<(), CliError> {
    let session = ready_session(event, db_path).await?;
    let outcome = session.handle_scan(payload).await?;
    report_outcome(&session, &outcome).await;
    Ok(())
}

async fn report_outcome(session: &Session, outcome: &CheckInOutcome) {
    println!("{}", format_outcome(outcome));
    if matches!(outcome, CheckInOutcome::CheckedIn(_)) {
        push_after_check_in(session).await;
    }
    println!("{}", format_stats_line(&session.view().stats));
}
