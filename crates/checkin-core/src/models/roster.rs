//! Ordered attendee roster keyed by participant id

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Attendee, ParticipantId};

/// Result of inserting a record into the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Attendees in arrival order with an id index.
///
/// Serializes as a plain JSON array, the same shape the remote API uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Attendee>", into = "Vec<Attendee>")]
pub struct Roster {
    attendees: Vec<Attendee>,
    index: HashMap<ParticipantId, usize>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attendees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty()
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Attendee> {
        let position = *self.index.get(&id)?;
        self.attendees.get(position)
    }

    pub fn get_mut(&mut self, id: ParticipantId) -> Option<&mut Attendee> {
        let position = *self.index.get(&id)?;
        self.attendees.get_mut(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attendee> {
        self.attendees.iter()
    }

    /// Replace the record with the same id in place, or append it.
    pub fn upsert(&mut self, attendee: Attendee) -> Upsert {
        if let Some(&position) = self.index.get(&attendee.participant_id) {
            self.attendees[position] = attendee;
            Upsert::Updated
        } else {
            self.index
                .insert(attendee.participant_id, self.attendees.len());
            self.attendees.push(attendee);
            Upsert::Inserted
        }
    }

    /// Number of attendees satisfying the checked-in predicate.
    pub fn checked_in_count(&self) -> usize {
        self.attendees
            .iter()
            .filter(|attendee| attendee.is_checked_in())
            .count()
    }
}

impl From<Vec<Attendee>> for Roster {
    fn from(attendees: Vec<Attendee>) -> Self {
        let mut roster = Self::new();
        for attendee in attendees {
            roster.upsert(attendee);
        }
        roster
    }
}

impl From<Roster> for Vec<Attendee> {
    fn from(roster: Roster) -> Self {
        roster.attendees
    }
}
