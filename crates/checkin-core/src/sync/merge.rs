//! Field-level merge of remote attendee records into the local roster.
//!
//! Remote values win, except that check-in state is monotonic: a remote
//! snapshot taken before a local check-in must not undo it.

use chrono::{DateTime, Utc};

use crate::models::{
    is_checked_in_status, Attendee, ParticipantId, Roster, Upsert, STATUS_CHECKED_IN,
};

/// Counts of what a batch merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub inserted: usize,
    pub updated: usize,
}

/// Merge a remote record onto the local one.
///
/// Display fields take the remote value when it is present. Check-in state
/// never regresses: the flag stays set, `checked_in_at` keeps the newer of
/// the two values, and a 3/4 status is not lowered. Statuses at or above
/// the excluded range are still accepted from the remote.
pub fn merge_attendee(local: &Attendee, remote: Attendee) -> Attendee {
    let mut merged = remote;

    if merged.name.is_none() {
        merged.name.clone_from(&local.name);
    }
    if merged.email.is_none() {
        merged.email.clone_from(&local.email);
    }
    if merged.phone.is_none() {
        merged.phone.clone_from(&local.phone);
    }

    let mut extra = local.extra.clone();
    extra.extend(std::mem::take(&mut merged.extra));
    merged.extra = extra;

    merged.checked_in |= local.checked_in;
    merged.checked_in_at = newest(local.checked_in_at, merged.checked_in_at);
    if is_checked_in_status(local.status_id) && merged.status_id < STATUS_CHECKED_IN {
        merged.status_id = local.status_id;
    }

    merged
}

/// Merge a batch of remote records, appending unknown participants.
pub fn merge_into(roster: &mut Roster, remote: Vec<Attendee>) -> MergeReport {
    let mut report = MergeReport::default();
    for record in remote {
        let merged = match roster.get(record.participant_id) {
            Some(local) => merge_attendee(local, record),
            None => record,
        };
        match roster.upsert(merged) {
            Upsert::Inserted => report.inserted += 1,
            Upsert::Updated => report.updated += 1,
        }
    }
    report
}

/// Re-apply locally accepted check-ins on top of a freshly loaded roster.
///
/// Returns the ids whose check-in state was restored from `pending`.
pub fn reapply_pending(roster: &mut Roster, pending: &[Attendee]) -> Vec<ParticipantId> {
    let mut restored = Vec::new();
    for snapshot in pending {
        let Some(current) = roster.get(snapshot.participant_id) else {
            continue;
        };
        if current.is_checked_in() {
            continue;
        }
        let merged = merge_attendee(snapshot, current.clone());
        roster.upsert(merged);
        restored.push(snapshot.participant_id);
    }
    restored
}

fn newest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 12, hour, 0, 0).unwrap()
    }

    fn checked_in(id: i64, hour: u32) -> Attendee {
        let mut attendee = Attendee::new(id, 1);
        attendee.mark_checked_in(at(hour));
        attendee
    }

    #[test]
    fn stale_remote_does_not_undo_local_check_in() {
        let local = checked_in(1, 9);
        let remote = Attendee::new(1, 1).with_name("Ada");

        let merged = merge_attendee(&local, remote);
        assert!(merged.checked_in);
        assert_eq!(merged.status_id, 3);
        assert_eq!(merged.checked_in_at, Some(at(9)));
        assert_eq!(merged.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn newer_remote_check_in_time_wins() {
        let local = checked_in(1, 9);
        let mut remote = Attendee::new(1, 4);
        remote.checked_in = true;
        remote.checked_in_at = Some(at(11));

        let merged = merge_attendee(&local, remote);
        assert_eq!(merged.checked_in_at, Some(at(11)));
        assert_eq!(merged.status_id, 4);
    }

    #[test]
    fn older_remote_check_in_time_is_ignored() {
        let local = checked_in(1, 11);
        let mut remote = Attendee::new(1, 3);
        remote.checked_in_at = Some(at(9));

        assert_eq!(merge_attendee(&local, remote).checked_in_at, Some(at(11)));
    }

    #[test]
    fn remote_cancellation_is_accepted() {
        let local = checked_in(1, 9);
        let remote = Attendee::new(1, 6);

        let merged = merge_attendee(&local, remote);
        assert_eq!(merged.status_id, 6);
        assert_eq!(merged.checked_in_at, Some(at(9)));
    }

    #[test]
    fn remote_fields_win_and_absent_fields_keep_local() {
        let mut local = Attendee::new(1, 1).with_name("Ada");
        local.email = Some("old@example.com".to_string());
        local.phone = Some("555-0100".to_string());
        local.extra.insert("Group".to_string(), json!("A"));

        let mut remote = Attendee::new(1, 2);
        remote.email = Some("new@example.com".to_string());
        remote.extra.insert("Seat".to_string(), json!("B4"));

        let merged = merge_attendee(&local, remote);
        assert_eq!(merged.name.as_deref(), Some("Ada"));
        assert_eq!(merged.email.as_deref(), Some("new@example.com"));
        assert_eq!(merged.phone.as_deref(), Some("555-0100"));
        assert_eq!(merged.status_id, 2);
        assert_eq!(merged.extra.get("Group"), Some(&json!("A")));
        assert_eq!(merged.extra.get("Seat"), Some(&json!("B4")));
    }

    #[test]
    fn merge_into_appends_unknown_and_updates_known() {
        let mut roster = Roster::from(vec![Attendee::new(1, 1)]);
        let report = merge_into(
            &mut roster,
            vec![Attendee::new(1, 2), Attendee::new(2, 1)],
        );

        assert_eq!(
            report,
            MergeReport {
                inserted: 1,
                updated: 1
            }
        );
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get(ParticipantId::new(1)).unwrap().status_id, 2);
    }

    #[test]
    fn reapply_pending_restores_only_missing_check_ins() {
        let mut roster = Roster::from(vec![Attendee::new(1, 1), checked_in(2, 8)]);
        let pending = vec![checked_in(1, 9), checked_in(2, 9), checked_in(3, 9)];

        let restored = reapply_pending(&mut roster, &pending);
        assert_eq!(restored, vec![ParticipantId::new(1)]);

        let first = roster.get(ParticipantId::new(1)).unwrap();
        assert!(first.is_checked_in());
        assert_eq!(first.checked_in_at, Some(at(9)));
        assert_eq!(
            roster.get(ParticipantId::new(2)).unwrap().checked_in_at,
            Some(at(8))
        );
    }
}
