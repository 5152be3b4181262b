//! Roster lookup for manual check-in.

use crate::models::{Attendee, Roster};

/// Attendees matching `query` in roster order.
///
/// Matching is case-insensitive and ignores dashes, so `5550100` finds a
/// phone stored as `555-0100`. Name, participant id, email and phone are
/// searched. An empty query returns everyone.
pub fn filter_attendees<'a>(roster: &'a Roster, query: &str) -> Vec<&'a Attendee> {
    let query = normalize(query);
    roster
        .iter()
        .filter(|attendee| matches(attendee, &query))
        .collect()
}

fn matches(attendee: &Attendee, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let field_matches = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|value| normalize(value).contains(query))
    };

    attendee.participant_id.to_string().contains(query)
        || field_matches(&attendee.name)
        || field_matches(&attendee.email)
        || field_matches(&attendee.phone)
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase().replace('-', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roster() -> Roster {
        let mut ada = Attendee::new(1042, 1).with_name("Ada Lovelace");
        ada.email = Some("ada@example.com".to_string());
        ada.phone = Some("555-0100".to_string());
        let grace = Attendee::new(2077, 1).with_name("Grace Hopper");
        let unnamed = Attendee::new(3001, 1);
        Roster::from(vec![ada, grace, unnamed])
    }

    fn ids(matches: &[&Attendee]) -> Vec<i64> {
        matches.iter().map(|a| a.participant_id.get()).collect()
    }

    #[test]
    fn empty_query_matches_everyone() {
        assert_eq!(ids(&filter_attendees(&roster(), "  ")), vec![1042, 2077, 3001]);
    }

    #[test]
    fn matches_name_case_insensitively() {
        assert_eq!(ids(&filter_attendees(&roster(), "HOPPER")), vec![2077]);
    }

    #[test]
    fn matches_id_digits_email_and_phone() {
        let roster = roster();
        assert_eq!(ids(&filter_attendees(&roster, "077")), vec![2077]);
        assert_eq!(ids(&filter_attendees(&roster, "ada@")), vec![1042]);
        assert_eq!(ids(&filter_attendees(&roster, "5550100")), vec![1042]);
        assert_eq!(ids(&filter_attendees(&roster, "555-01")), vec![1042]);
    }

    #[test]
    fn unmatched_query_returns_nothing() {
        assert!(filter_attendees(&roster(), "turing").is_empty());
    }
}
