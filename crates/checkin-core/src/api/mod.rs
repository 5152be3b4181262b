//! Remote roster API.
//!
//! The remote system owns the authoritative roster. The scanner reads it
//! (fully or incrementally) and uploads batches of check-in snapshots.

mod http;

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Attendee, EventId, RosterSnapshot};

pub use http::HttpRosterApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Event not found: {0}")]
    EventNotFound(EventId),
    #[error("Roster API HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Roster API error: {0}")]
    Api(String),
    #[error("Invalid roster payload: {0}")]
    InvalidPayload(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the scanner needs from the remote system.
pub trait RosterApi: Send + Sync {
    /// Fetch the roster, or only records changed at or after `since`.
    fn fetch_roster(
        &self,
        event_id: &EventId,
        since: Option<DateTime<Utc>>,
    ) -> impl Future<Output = ApiResult<RosterSnapshot>> + Send;

    /// Upload check-in snapshots; the remote applies them idempotently.
    fn upload_check_ins(&self, batch: &[Attendee]) -> impl Future<Output = ApiResult<()>> + Send;
}
