//! Decoding of scanned QR payloads.
//!
//! A ticket code is a JSON object carrying the participant id under
//! `Event_Participant_ID`. Readers report the same code many times per
//! second while it stays in view, so repeats are debounced.

use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;

use crate::models::ParticipantId;

const PARTICIPANT_ID_FIELD: &str = "Event_Participant_ID";

/// Window in which an identical payload is treated as the same scan.
pub const SCAN_DEDUP_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("payload has no usable Event_Participant_ID")]
    MissingParticipantId,
}

/// Extract the participant id from a decoded QR payload.
pub fn parse_scan_payload(payload: &str) -> Result<ParticipantId, ScanError> {
    let value: Value = serde_json::from_str(payload.trim()).map_err(|_| ScanError::NotAnObject)?;
    let Value::Object(fields) = value else {
        return Err(ScanError::NotAnObject);
    };

    fields
        .get(PARTICIPANT_ID_FIELD)
        .and_then(Value::as_i64)
        .filter(|id| *id > 0)
        .map(ParticipantId::new)
        .ok_or(ScanError::MissingParticipantId)
}

/// Drops repeats of the last payload seen within the dedup window.
#[derive(Debug)]
pub struct ScanDebouncer {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl Default for ScanDebouncer {
    fn default() -> Self {
        Self::new(SCAN_DEDUP_WINDOW)
    }
}

impl ScanDebouncer {
    pub const fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns `true` when the payload should be processed.
    pub fn accept(&mut self, payload: &str, now: Instant) -> bool {
        if let Some((text, at)) = &self.last {
            if text == payload && now.saturating_duration_since(*at) < self.window {
                return false;
            }
        }
        self.last = Some((payload.to_string(), now));
        true
    }
}
