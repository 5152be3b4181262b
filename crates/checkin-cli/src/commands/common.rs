use std::env;
use std::path::{Path, PathBuf};

use checkin_core::api::HttpRosterApi;
use checkin_core::config::ScannerConfig;
use checkin_core::db::{Database, EventCache, LibSqlLocalStore};
use checkin_core::models::{timestamp, Roster};
use checkin_core::state::{RosterStats, RosterTotals};
use checkin_core::sync::{CheckInOutcome, PushOutcome};
use checkin_core::{Attendee, EventDetails, EventId, RosterSync};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CliError;

pub type Session = RosterSync<HttpRosterApi, LibSqlLocalStore>;

#[derive(Debug, Serialize)]
pub struct AttendeeItem {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status_id: i64,
    pub checked_in: bool,
    pub checked_in_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub event_id: String,
    pub event_name: String,
    pub event_date: String,
    pub total: u64,
    pub checked_in: u64,
    pub my_check_ins: u64,
    pub pending_uploads: usize,
    pub last_sync: Option<String>,
}

pub fn resolve_event(cli_event: Option<String>) -> Result<EventId, CliError> {
    let raw = cli_event
        .or_else(|| env::var("CHECKIN_EVENT_ID").ok())
        .unwrap_or_default();
    Ok(raw.parse()?)
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("CHECKIN_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("checkin")
        .join("checkin.db")
}

pub async fn open_cache(
    event: &EventId,
    db_path: &Path,
) -> Result<EventCache<LibSqlLocalStore>, CliError> {
    let db = Database::open(db_path).await?;
    Ok(EventCache::new(LibSqlLocalStore::new(db), event.clone()))
}

pub async fn open_session(
    config: &ScannerConfig,
    event: &EventId,
    db_path: &Path,
) -> Result<Session, CliError> {
    let api = HttpRosterApi::new(config)?;
    let db = Database::open(db_path).await?;
    Ok(RosterSync::open(
        api,
        LibSqlLocalStore::new(db),
        event.clone(),
        config.watermark_skew,
    )
    .await?)
}

/// Session accepting check-ins: resumed from the cache when a previous load
/// completed, otherwise loaded from the API.
pub async fn ready_session(event: &EventId, db_path: &Path) -> Result<Session, CliError> {
    let config = ScannerConfig::from_env()?;
    let session = open_session(&config, event, db_path).await?;
    if !session.resume().await {
        session.initial_load().await?;
    }
    Ok(session)
}

/// Try to upload right away; failures leave the queue for a later push.
pub async fn push_after_check_in(session: &Session) {
    match session.push().await {
        Ok(PushOutcome::Uploaded(count)) => println!("Uploaded {count} check-ins"),
        Ok(_) => {}
        Err(error) => println!(
            "{error}. {} check-ins queued for upload.",
            session.view().pending_uploads
        ),
    }
}

pub fn status_report(
    event: &EventId,
    details: &EventDetails,
    stats: RosterStats,
    pending_uploads: usize,
    watermark: Option<DateTime<Utc>>,
) -> StatusReport {
    StatusReport {
        event_id: event.to_string(),
        event_name: details.name.clone(),
        event_date: details.date.clone(),
        total: stats.total,
        checked_in: stats.checked_in,
        my_check_ins: stats.my_check_ins,
        pending_uploads,
        last_sync: watermark.as_ref().map(timestamp::format),
    }
}

/// Counters for an offline status: the totals the last session published,
/// or a count over the cached roster when none were stored.
pub fn roster_stats(
    roster: &Roster,
    totals: Option<RosterTotals>,
    my_check_ins: u64,
) -> RosterStats {
    let totals = totals.unwrap_or(RosterTotals {
        total: roster.len() as u64,
        checked_in: roster.checked_in_count() as u64,
    });
    RosterStats {
        total: totals.total,
        checked_in: totals.checked_in,
        my_check_ins,
    }
}

/// Scanner header, e.g. `Checked In: 37 / 120  (#12 here)`
pub fn format_stats_line(stats: &RosterStats) -> String {
    format!("{stats}  ({} here)", stats.my_check_ins_label())
}

pub fn format_status_lines(report: &StatusReport) -> Vec<String> {
    let mut lines = vec![report.event_name.clone()];
    if !report.event_date.is_empty() {
        lines.push(report.event_date.clone());
    }
    lines.push(format_stats_line(&RosterStats {
        total: report.total,
        checked_in: report.checked_in,
        my_check_ins: report.my_check_ins,
    }));
    lines.push(format!("Pending uploads: {}", report.pending_uploads));
    lines.push(format!(
        "Last sync: {}",
        report.last_sync.as_deref().unwrap_or("never")
    ));
    lines
}

pub fn attendee_to_item(attendee: &Attendee) -> AttendeeItem {
    AttendeeItem {
        id: attendee.participant_id.get(),
        name: attendee.name.clone(),
        email: attendee.email.clone(),
        phone: attendee.phone.clone(),
        status_id: attendee.status_id,
        checked_in: attendee.is_checked_in(),
        checked_in_at: attendee.checked_in_at.as_ref().map(timestamp::format),
    }
}

pub fn format_attendee_line(attendee: &Attendee) -> String {
    let mark = if attendee.is_checked_in() { "x" } else { " " };
    let contact = attendee
        .email
        .as_deref()
        .or(attendee.phone.as_deref())
        .unwrap_or("");
    format!(
        "[{mark}] {:>6}  {}  {contact}",
        attendee.participant_id.get(),
        attendee.display_name()
    )
    .trim_end()
    .to_string()
}

pub fn format_outcome(outcome: &CheckInOutcome) -> String {
    match outcome {
        CheckInOutcome::CheckedIn(attendee) => format!(
            "Checked in: {} (#{})",
            attendee.display_name(),
            attendee.participant_id
        ),
        CheckInOutcome::AlreadyCheckedIn(attendee) => format!(
            "Already checked in: {} (#{})",
            attendee.display_name(),
            attendee.participant_id
        ),
        CheckInOutcome::NotFound(id) => format!("Participant {id} not found"),
    }
}
