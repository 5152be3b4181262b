//! Attendee model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::timestamp;

/// Status code the scanner writes on a successful check-in.
pub const STATUS_CHECKED_IN: i64 = 3;
/// Alternate "checked in" status assigned by the remote system.
pub const STATUS_CHECKED_IN_ALT: i64 = 4;
/// Statuses at or above this value (cancelled, etc.) are never matched.
pub const STATUS_EXCLUDED_FROM: i64 = 5;

/// Participant identifier, unique within one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(i64);

impl ParticipantId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ParticipantId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// One registered participant, in the remote API's wire shape.
///
/// Fields the scanner does not interpret are kept in `extra` so uploads
/// send back whatever the server provided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(rename = "Event_Participant_ID")]
    pub participant_id: ParticipantId,
    #[serde(rename = "Participant_Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Email_Address", default)]
    pub email: Option<String>,
    #[serde(rename = "Mobile_Phone", default)]
    pub phone: Option<String>,
    #[serde(rename = "Participation_Status_ID", default)]
    pub status_id: i64,
    #[serde(rename = "Checked_In", default, deserialize_with = "null_as_false")]
    pub checked_in: bool,
    #[serde(rename = "Checked_In_Date", default, with = "timestamp::option")]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attendee {
    /// Create a registered, not-yet-checked-in attendee
    #[must_use]
    pub fn new(participant_id: i64, status_id: i64) -> Self {
        Self {
            participant_id: ParticipantId::new(participant_id),
            name: None,
            email: None,
            phone: None,
            status_id,
            checked_in: false,
            checked_in_at: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Checked in if the flag is set, a check-in time exists, or the status
    /// is one of the checked-in variants.
    #[must_use]
    pub const fn is_checked_in(&self) -> bool {
        self.checked_in || self.checked_in_at.is_some() || is_checked_in_status(self.status_id)
    }

    /// Whether a scan may match this attendee at all.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.status_id < STATUS_EXCLUDED_FROM
    }

    /// Apply a local check-in.
    pub fn mark_checked_in(&mut self, at: DateTime<Utc>) {
        self.checked_in = true;
        self.status_id = STATUS_CHECKED_IN;
        self.checked_in_at = Some(at);
    }

    /// Name for display, falling back to the participant id.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("#{}", self.participant_id), ToString::to_string)
    }
}

/// Status 3 and 4 both mean "checked in".
#[must_use]
pub const fn is_checked_in_status(status_id: i64) -> bool {
    status_id == STATUS_CHECKED_IN || status_id == STATUS_CHECKED_IN_ALT
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
