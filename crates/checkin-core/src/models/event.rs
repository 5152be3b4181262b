//! Event session models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Attendee;
use crate::error::Error;

const DEFAULT_EVENT_NAME: &str = "Event Check-In";

/// Identifier of the event a scanner session is bound to.
///
/// Supplied by the launching context and fixed for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EventId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput(
                "No event ID specified; check the event link".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Event metadata shown alongside the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub name: String,
    #[serde(default)]
    pub date: String,
}

impl Default for EventDetails {
    fn default() -> Self {
        Self {
            name: DEFAULT_EVENT_NAME.to_string(),
            date: String::new(),
        }
    }
}

impl EventDetails {
    /// Take the remote title/date where present, keeping current values otherwise.
    pub fn absorb(&mut self, snapshot: &RosterSnapshot) {
        if let Some(title) = crate::util::non_blank(snapshot.event_title.clone()) {
            self.name = title;
        }
        if let Some(date) = crate::util::non_blank(snapshot.event_start_date.clone()) {
            self.date = date;
        }
    }
}

/// Body of the remote roster endpoint.
///
/// Incremental responses may omit everything except the attendee list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(rename = "Event_Title", default)]
    pub event_title: Option<String>,
    #[serde(rename = "Event_Start_Date", default)]
    pub event_start_date: Option<String>,
    #[serde(rename = "Num_Attendees", default)]
    pub num_attendees: Option<u64>,
    #[serde(rename = "Num_Checked_In", default)]
    pub num_checked_in: Option<u64>,
    #[serde(rename = "Attendees_List", default)]
    pub attendees: Option<Vec<Attendee>>,
}
