//! Data models for the check-in roster

mod attendee;
mod event;
mod roster;
pub mod timestamp;

pub use attendee::{
    is_checked_in_status, Attendee, ParticipantId, STATUS_CHECKED_IN, STATUS_CHECKED_IN_ALT,
    STATUS_EXCLUDED_FROM,
};
pub use event::{EventDetails, EventId, RosterSnapshot};
pub use roster::{Roster, Upsert};
