use std::path::PathBuf;

use checkin_core::models::Roster;
use checkin_core::state::{RosterStats, RosterTotals};
use checkin_core::sync::CheckInOutcome;
use checkin_core::{Attendee, EventDetails, ParticipantId};
use chrono::{TimeZone, Utc};
use clap::Parser;
use pretty_assertions::assert_eq;

use crate::cli::{Cli, Commands, CompletionShell};
use crate::commands::common::{
    attendee_to_item, default_db_path, format_attendee_line, format_outcome, format_stats_line,
    format_status_lines, resolve_db_path, resolve_event, roster_stats, status_report,
};
use crate::commands::completions::render_completions;
use crate::error::CliError;

fn ada() -> Attendee {
    let mut ada = Attendee::new(1042, 1).with_name("Ada Lovelace");
    ada.email = Some("ada@example.com".to_string());
    ada
}

#[test]
fn parses_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "checkin",
        "check-in",
        "1042",
        "--event",
        "spring-gala",
        "--db-path",
        "/tmp/checkin.db",
    ])
    .unwrap();

    assert!(matches!(cli.command, Commands::CheckIn { id: 1042 }));
    assert_eq!(cli.event.as_deref(), Some("spring-gala"));
    assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/checkin.db")));
}

#[test]
fn search_query_is_optional() {
    let cli = Cli::try_parse_from(["checkin", "search", "--json"]).unwrap();
    match cli.command {
        Commands::Search { query, limit, json } => {
            assert_eq!(query, None);
            assert_eq!(limit, 20);
            assert!(json);
        }
        _ => panic!("expected search command"),
    }
}

#[test]
fn check_in_rejects_non_numeric_ids() {
    assert!(Cli::try_parse_from(["checkin", "check-in", "ada"]).is_err());
}

#[test]
fn resolve_event_prefers_flag_and_rejects_blank() {
    let event = resolve_event(Some(" 1024 ".to_string())).unwrap();
    assert_eq!(event.as_str(), "1024");

    let error = resolve_event(Some("   ".to_string())).unwrap_err();
    assert!(matches!(error, CliError::Core(_)));
    assert!(error.to_string().contains("No event ID specified"));
}

#[test]
fn resolve_db_path_prefers_flag() {
    let path = PathBuf::from("/tmp/custom.db");
    assert_eq!(resolve_db_path(Some(path.clone())), path);
}

#[test]
fn default_db_path_lives_under_checkin_dir() {
    let path = default_db_path();
    assert!(path.ends_with("checkin/checkin.db"));
}

#[test]
fn format_outcome_describes_each_case() {
    assert_eq!(
        format_outcome(&CheckInOutcome::CheckedIn(ada())),
        "Checked in: Ada Lovelace (#1042)"
    );
    assert_eq!(
        format_outcome(&CheckInOutcome::AlreadyCheckedIn(ada())),
        "Already checked in: Ada Lovelace (#1042)"
    );
    assert_eq!(
        format_outcome(&CheckInOutcome::NotFound(ParticipantId::new(7))),
        "Participant 7 not found"
    );
}

#[test]
fn attendee_line_marks_checked_in() {
    let mut attendee = ada();
    assert_eq!(
        format_attendee_line(&attendee),
        "[ ]   1042  Ada Lovelace  ada@example.com"
    );

    attendee.mark_checked_in(Utc.with_ymd_and_hms(2025, 4, 12, 18, 0, 0).unwrap());
    assert!(format_attendee_line(&attendee).starts_with("[x]"));
}

#[test]
fn attendee_item_formats_check_in_time() {
    let mut attendee = ada();
    attendee.mark_checked_in(Utc.with_ymd_and_hms(2025, 4, 12, 18, 0, 0).unwrap());

    let item = attendee_to_item(&attendee);
    assert_eq!(item.id, 1042);
    assert_eq!(item.status_id, 3);
    assert!(item.checked_in);
    assert_eq!(
        item.checked_in_at.as_deref(),
        Some("2025-04-12T18:00:00.000Z")
    );
}

#[test]
fn status_lines_include_counters_and_sync_time() {
    let mut checked_in = Attendee::new(2, 1);
    checked_in.mark_checked_in(Utc.with_ymd_and_hms(2025, 4, 12, 18, 0, 0).unwrap());
    let roster = Roster::from(vec![Attendee::new(1, 1), checked_in]);
    let details = EventDetails {
        name: "Spring Gala".to_string(),
        date: "2025-04-12".to_string(),
    };

    let report = status_report(
        &"1024".parse().unwrap(),
        &details,
        roster_stats(&roster, None, 1),
        1,
        Some(Utc.with_ymd_and_hms(2025, 4, 12, 18, 30, 0).unwrap()),
    );

    assert_eq!(
        format_status_lines(&report),
        vec![
            "Spring Gala".to_string(),
            "2025-04-12".to_string(),
            "Checked In: 1 / 2  (#1 here)".to_string(),
            "Pending uploads: 1".to_string(),
            "Last sync: 2025-04-12T18:30:00.000Z".to_string(),
        ]
    );
}

#[test]
fn status_lines_without_sync() {
    let report = status_report(
        &"1024".parse().unwrap(),
        &EventDetails::default(),
        RosterStats::default(),
        0,
        None,
    );
    let lines = format_status_lines(&report);
    assert_eq!(lines[0], "Event Check-In");
    assert_eq!(lines.last().map(String::as_str), Some("Last sync: never"));
}

#[test]
fn status_prefers_stored_totals() {
    let roster = Roster::from(vec![Attendee::new(1, 1), Attendee::new(2, 1)]);
    let stats = roster_stats(
        &roster,
        Some(RosterTotals {
            total: 120,
            checked_in: 37,
        }),
        12,
    );

    assert_eq!(
        stats,
        RosterStats {
            total: 120,
            checked_in: 37,
            my_check_ins: 12,
        }
    );
    assert_eq!(format_stats_line(&stats), "Checked In: 37 / 120  (#12 here)");
}

#[test]
fn completions_mention_binary_name() {
    for shell in [
        CompletionShell::Bash,
        CompletionShell::Zsh,
        CompletionShell::Fish,
    ] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("checkin"));
    }
}
