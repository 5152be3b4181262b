//! checkin-core - Core library for the event check-in scanner
//!
//! This crate holds the attendee roster models, the libSQL-backed local
//! cache, the remote roster API client, and `RosterSync`, which reconciles
//! local check-ins with the remote source of truth.

pub mod api;
pub mod camera;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod scan;
pub mod search;
pub mod state;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Attendee, EventDetails, EventId, ParticipantId};
pub use sync::{CheckInOutcome, RosterSync, SyncError};
