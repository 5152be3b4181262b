//! Session state and the read-only projections observers render.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::EventDetails;

/// Why the initial roster load did not complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailure {
    /// The remote does not know the event; the session cannot proceed.
    EventNotFound,
    /// Transient failure; loading may be retried.
    LoadFailed,
}

/// Lifecycle of one scanner session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum SessionState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Failed(LoadFailure),
}

impl SessionState {
    /// Scanning and check-ins are only accepted once the roster is loaded.
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Every state except a missing event may (re-)enter `Loading`.
    pub const fn can_load(self) -> bool {
        !matches!(self, Self::Loading | Self::Failed(LoadFailure::EventNotFound))
    }
}

/// Transfer indicators; error flags clear on the next successful attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncIndicators {
    pub downloading: bool,
    pub download_error: bool,
    pub uploading: bool,
    pub upload_error: bool,
    pub storage_error: bool,
}

/// Counters shown next to the scanner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RosterStats {
    pub total: u64,
    pub checked_in: u64,
    pub my_check_ins: u64,
}

impl RosterStats {
    /// Label for the local check-in counter, e.g. `#12`
    pub fn my_check_ins_label(&self) -> String {
        format!("#{}", self.my_check_ins)
    }
}

impl fmt::Display for RosterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checked In: {} / {}", self.checked_in, self.total)
    }
}

/// Event-wide counters as last shown, kept so an offline status matches
/// the running session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTotals {
    pub total: u64,
    pub checked_in: u64,
}

/// Everything a presentation layer needs, republished after every mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub details: EventDetails,
    pub stats: RosterStats,
    pub indicators: SyncIndicators,
    pub pending_uploads: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_event_blocks_reload() {
        assert!(SessionState::Uninitialized.can_load());
        assert!(SessionState::Ready.can_load());
        assert!(SessionState::Failed(LoadFailure::LoadFailed).can_load());
        assert!(!SessionState::Loading.can_load());
        assert!(!SessionState::Failed(LoadFailure::EventNotFound).can_load());
    }

    #[test]
    fn stats_render_like_the_scanner_header() {
        let stats = RosterStats {
            total: 120,
            checked_in: 37,
            my_check_ins: 12,
        };
        assert_eq!(stats.to_string(), "Checked In: 37 / 120");
        assert_eq!(stats.my_check_ins_label(), "#12");
    }
}
