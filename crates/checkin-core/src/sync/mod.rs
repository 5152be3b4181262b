//! Roster reconciliation between the local cache and the remote API.
//!
//! `RosterSync` owns the in-memory roster, the pending upload queue and the
//! pull watermark for one event session. Check-ins are applied and persisted
//! locally before any network traffic and are never rolled back; uploads and
//! incremental pulls run on their own schedules and only report recoverable
//! failures.

mod driver;
mod merge;
mod queue;
mod watermark;


use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{watch, Mutex};

use crate::api::{ApiError, RosterApi};
use crate::db::{CacheKey, EventCache, LocalStore};
use crate::error::Result;
use crate::models::{Attendee, EventDetails, EventId, ParticipantId, Roster};
use crate::scan::parse_scan_payload;
use crate::search::filter_attendees;
use crate::state::{
    LoadFailure, RosterStats, RosterTotals, SessionState, SessionView, SyncIndicators,
};

pub use driver::{DriverHandle, SyncDriver};
pub use merge::{merge_attendee, merge_into, reapply_pending, MergeReport};
pub use queue::PendingQueue;
pub use watermark::next_watermark;

/// Failure signals surfaced by `RosterSync` operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Event not found; check the event link")]
    EventNotFound,
    #[error("Failed to load event roster: {0}")]
    LoadFailed(String),
    #[error("Failed to upload check-ins: {0}")]
    PushFailed(String),
    #[error("Failed to fetch roster updates: {0}")]
    PullFailed(String),
    #[error("Invalid code: {0}")]
    InvalidPayload(String),
    #[error("Event roster is not loaded")]
    NotReady,
    #[error("Event roster is already loading")]
    LoadInProgress,
}

impl SyncError {
    /// Only a missing event ends the session; everything else is retried.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::EventNotFound)
    }
}

/// Result of a check-in attempt. Only `CheckedIn` mutates state.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    CheckedIn(Attendee),
    AlreadyCheckedIn(Attendee),
    NotFound(ParticipantId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Nothing was queued.
    Idle,
    /// Another push is still running.
    InFlight,
    Uploaded(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    InFlight,
    Merged(MergeReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub attendees: usize,
    pub restored_check_ins: usize,
}

struct Inner {
    state: SessionState,
    roster: Roster,
    details: EventDetails,
    pending: PendingQueue,
    watermark: Option<DateTime<Utc>>,
    total: u64,
    checked_in: u64,
    my_check_ins: u64,
    indicators: SyncIndicators,
}

impl Inner {
    fn view(&self) -> SessionView {
        SessionView {
            state: self.state,
            details: self.details.clone(),
            stats: RosterStats {
                total: self.total,
                checked_in: self.checked_in,
                my_check_ins: self.my_check_ins,
            },
            indicators: self.indicators,
            pending_uploads: self.pending.len(),
        }
    }

    const fn totals(&self) -> RosterTotals {
        RosterTotals {
            total: self.total,
            checked_in: self.checked_in,
        }
    }

    fn recount(&mut self) {
        self.total = self.roster.len() as u64;
        self.checked_in = self.roster.checked_in_count() as u64;
    }
}

/// Clears an in-flight flag when the operation finishes, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::AcqRel)).then_some(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Attendee state for one event session.
pub struct RosterSync<A, S> {
    api: A,
    cache: EventCache<S>,
    watermark_skew: Duration,
    inner: Mutex<Inner>,
    load_in_flight: AtomicBool,
    push_in_flight: AtomicBool,
    pull_in_flight: AtomicBool,
    view_tx: watch::Sender<SessionView>,
}

impl<A: RosterApi, S: LocalStore> RosterSync<A, S> {
    /// Restore the session from the local cache.
    ///
    /// The session starts `Uninitialized`; `initial_load` must succeed
    /// before check-ins are accepted.
    pub async fn open(
        api: A,
        store: S,
        event_id: EventId,
        watermark_skew: Duration,
    ) -> Result<Self> {
        let cache = EventCache::new(store, event_id);
        let roster = cache.load_roster().await?.unwrap_or_default();
        let details = cache.load_details().await?.unwrap_or_default();
        let pending = PendingQueue::from(cache.load_pending().await?);
        let my_check_ins = cache.load_my_check_ins().await?;
        let watermark = cache.load_watermark().await?;
        let totals = cache.load_totals().await?;

        tracing::debug!(
            "Restored {} attendees and {} pending uploads for event {}",
            roster.len(),
            pending.len(),
            cache.event_id()
        );

        let mut inner = Inner {
            state: SessionState::Uninitialized,
            roster,
            details,
            pending,
            watermark,
            total: 0,
            checked_in: 0,
            my_check_ins,
            indicators: SyncIndicators::default(),
        };
        inner.recount();
        // Counters as last published, remote aggregates included
        if let Some(totals) = totals {
            inner.total = totals.total;
            inner.checked_in = totals.checked_in;
        }

        let (view_tx, _) = watch::channel(inner.view());
        Ok(Self {
            api,
            cache,
            watermark_skew,
            inner: Mutex::new(inner),
            load_in_flight: AtomicBool::new(false),
            push_in_flight: AtomicBool::new(false),
            pull_in_flight: AtomicBool::new(false),
            view_tx,
        })
    }

    pub const fn event_id(&self) -> &EventId {
        self.cache.event_id()
    }

    /// Receive a fresh `SessionView` after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    /// Latest published view.
    pub fn view(&self) -> SessionView {
        self.view_tx.borrow().clone()
    }

    pub async fn roster(&self) -> Roster {
        self.inner.lock().await.roster.clone()
    }

    pub async fn attendee(&self, id: ParticipantId) -> Option<Attendee> {
        self.inner.lock().await.roster.get(id).cloned()
    }

    pub async fn pending(&self) -> Vec<Attendee> {
        self.inner.lock().await.pending.snapshot()
    }

    pub async fn watermark(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().await.watermark
    }

    /// Attendees matching a search query, in roster order.
    pub async fn search(&self, query: &str) -> Vec<Attendee> {
        let inner = self.inner.lock().await;
        filter_attendees(&inner.roster, query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Full pull that replaces the roster with the remote snapshot.
    ///
    /// Check-ins still waiting for upload are re-applied on top of the new
    /// snapshot. A missing event is terminal; other failures leave the
    /// session retryable.
    pub async fn initial_load(&self) -> std::result::Result<LoadSummary, SyncError> {
        let Some(_guard) = InFlight::acquire(&self.load_in_flight) else {
            return Err(SyncError::LoadInProgress);
        };

        let previous = {
            let mut inner = self.inner.lock().await;
            let previous = inner.state;
            if !previous.can_load() {
                return Err(match previous {
                    SessionState::Loading => SyncError::LoadInProgress,
                    _ => SyncError::EventNotFound,
                });
            }
            if !previous.is_ready() {
                inner.state = SessionState::Loading;
            }
            inner.indicators.downloading = true;
            self.publish(&inner);
            previous
        };

        let started_at = Utc::now();
        let result = self.api.fetch_roster(self.event_id(), None).await;

        let mut inner = self.inner.lock().await;
        inner.indicators.downloading = false;

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(error) => {
                let (failure, signal) = match error {
                    ApiError::EventNotFound(_) => {
                        (LoadFailure::EventNotFound, SyncError::EventNotFound)
                    }
                    other => (
                        LoadFailure::LoadFailed,
                        SyncError::LoadFailed(other.to_string()),
                    ),
                };
                tracing::warn!("Initial load for event {} failed: {}", self.event_id(), signal);
                inner.indicators.download_error = true;
                if !previous.is_ready() {
                    inner.state = SessionState::Failed(failure);
                }
                self.publish(&inner);
                return Err(signal);
            }
        };

        inner.details.absorb(&snapshot);
        if let Some(attendees) = snapshot.attendees {
            inner.roster = Roster::from(attendees);
        }
        let pending = inner.pending.snapshot();
        let restored = reapply_pending(&mut inner.roster, &pending);

        let derived = inner.roster.checked_in_count() as u64;
        inner.total = snapshot
            .num_attendees
            .unwrap_or(inner.roster.len() as u64);
        inner.checked_in = snapshot
            .num_checked_in
            .map_or(derived, |remote| remote + restored.len() as u64);

        let watermark = next_watermark(started_at, self.watermark_skew);
        inner.watermark = Some(watermark);
        inner.state = SessionState::Ready;
        inner.indicators.download_error = false;

        self.persist(
            &mut inner,
            &[
                CacheKey::Attendees,
                CacheKey::EventDetails,
                CacheKey::Counters,
                CacheKey::Watermark,
            ],
        )
        .await;
        self.publish(&inner);

        tracing::info!(
            "Loaded {} attendees for event {} ({})",
            inner.roster.len(),
            self.event_id(),
            inner.details.name
        );
        Ok(LoadSummary {
            attendees: inner.roster.len(),
            restored_check_ins: restored.len(),
        })
    }

    /// Accept check-ins against the cached roster without reloading.
    ///
    /// Only a session restored from a previously completed load can resume;
    /// returns `false` when `initial_load` is still required.
    pub async fn resume(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.state.is_ready() {
            return true;
        }
        if inner.state != SessionState::Uninitialized || inner.watermark.is_none() {
            return false;
        }

        inner.state = SessionState::Ready;
        self.publish(&inner);
        tracing::debug!(
            "Resumed event {} from cache with {} attendees",
            self.event_id(),
            inner.roster.len()
        );
        true
    }

    /// Check in an attendee.
    ///
    /// The roster, counters and pending queue are updated and persisted in a
    /// single step before this returns. Uploading is left to `push`.
    pub async fn check_in(
        &self,
        id: ParticipantId,
    ) -> std::result::Result<CheckInOutcome, SyncError> {
        let mut inner = self.inner.lock().await;
        if !inner.state.is_ready() {
            return Err(SyncError::NotReady);
        }

        let now = Utc::now();
        let snapshot = match inner.roster.get_mut(id) {
            Some(attendee) if attendee.is_eligible() => {
                if attendee.is_checked_in() {
                    return Ok(CheckInOutcome::AlreadyCheckedIn(attendee.clone()));
                }
                attendee.mark_checked_in(now);
                attendee.clone()
            }
            _ => return Ok(CheckInOutcome::NotFound(id)),
        };

        inner.pending.push(snapshot.clone());
        inner.checked_in += 1;
        inner.my_check_ins += 1;

        self.persist(
            &mut inner,
            &[
                CacheKey::Attendees,
                CacheKey::Pending,
                CacheKey::MyCheckIns,
                CacheKey::Counters,
            ],
        )
        .await;
        self.publish(&inner);

        tracing::info!("Checked in participant {}", id);
        Ok(CheckInOutcome::CheckedIn(snapshot))
    }

    /// Decode a scanned payload and check the participant in.
    pub async fn handle_scan(
        &self,
        payload: &str,
    ) -> std::result::Result<CheckInOutcome, SyncError> {
        let id = parse_scan_payload(payload)
            .map_err(|error| SyncError::InvalidPayload(error.to_string()))?;
        self.check_in(id).await
    }

    /// Upload every queued check-in as one batch.
    ///
    /// Only the entries that were sent are removed on success; check-ins
    /// accepted meanwhile stay queued for the next push.
    pub async fn push(&self) -> std::result::Result<PushOutcome, SyncError> {
        let Some(_guard) = InFlight::acquire(&self.push_in_flight) else {
            return Ok(PushOutcome::InFlight);
        };

        let batch = {
            let mut inner = self.inner.lock().await;
            if inner.pending.is_empty() {
                return Ok(PushOutcome::Idle);
            }
            inner.indicators.uploading = true;
            self.publish(&inner);
            inner.pending.snapshot()
        };

        tracing::debug!("Uploading {} check-ins", batch.len());
        let result = self.api.upload_check_ins(&batch).await;

        let mut inner = self.inner.lock().await;
        inner.indicators.uploading = false;
        match result {
            Ok(()) => {
                inner.pending.remove_sent(batch.len());
                inner.indicators.upload_error = false;
                self.persist(&mut inner, &[CacheKey::Pending]).await;
                self.publish(&inner);
                tracing::info!(
                    "Uploaded {} check-ins ({} still queued)",
                    batch.len(),
                    inner.pending.len()
                );
                Ok(PushOutcome::Uploaded(batch.len()))
            }
            Err(error) => {
                inner.indicators.upload_error = true;
                self.publish(&inner);
                tracing::warn!("Error uploading check-ins: {}", error);
                Err(SyncError::PushFailed(error.to_string()))
            }
        }
    }

    /// Incremental pull from the stored watermark.
    pub async fn pull_updates(&self) -> std::result::Result<PullOutcome, SyncError> {
        let since = self.inner.lock().await.watermark;
        self.pull(since).await
    }

    /// Merge remote changes at or after `since` into the roster.
    ///
    /// The watermark only advances when the pull succeeds, so a failed
    /// window is requested again next time.
    pub async fn pull(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> std::result::Result<PullOutcome, SyncError> {
        let Some(_guard) = InFlight::acquire(&self.pull_in_flight) else {
            return Ok(PullOutcome::InFlight);
        };

        {
            let mut inner = self.inner.lock().await;
            if !inner.state.is_ready() {
                return Err(SyncError::NotReady);
            }
            inner.indicators.downloading = true;
            self.publish(&inner);
        }

        let started_at = Utc::now();
        let result = self.api.fetch_roster(self.event_id(), since).await;

        let mut inner = self.inner.lock().await;
        inner.indicators.downloading = false;
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(error) => {
                inner.indicators.download_error = true;
                self.publish(&inner);
                tracing::warn!("Error fetching attendees: {}", error);
                return Err(SyncError::PullFailed(error.to_string()));
            }
        };

        let report = merge_into(&mut inner.roster, snapshot.attendees.unwrap_or_default());
        inner.recount();
        inner.watermark = Some(next_watermark(started_at, self.watermark_skew));
        inner.indicators.download_error = false;

        let mut entries = vec![CacheKey::Watermark, CacheKey::Counters];
        if report.inserted + report.updated > 0 {
            entries.push(CacheKey::Attendees);
        }
        self.persist(&mut inner, &entries).await;
        self.publish(&inner);

        tracing::debug!(
            "Merged roster updates: {} new, {} updated",
            report.inserted,
            report.updated
        );
        Ok(PullOutcome::Merged(report))
    }

    /// Drop this event's cached state. In-memory state is left untouched.
    pub async fn clear_cache(&self) -> Result<()> {
        let _inner = self.inner.lock().await;
        self.cache.clear().await
    }

    /// Write the given entries; failures are logged and flagged, never raised.
    async fn persist(&self, inner: &mut Inner, entries: &[CacheKey]) {
        let mut failed = false;
        for &key in entries {
            let result = match key {
                CacheKey::Attendees => self.cache.save_roster(&inner.roster).await,
                CacheKey::Counters => self.cache.save_totals(&inner.totals()).await,
                CacheKey::EventDetails => self.cache.save_details(&inner.details).await,
                CacheKey::MyCheckIns => self.cache.save_my_check_ins(inner.my_check_ins).await,
                CacheKey::Pending => self.cache.save_pending(inner.pending.as_slice()).await,
                CacheKey::Watermark => match &inner.watermark {
                    Some(watermark) => self.cache.save_watermark(watermark).await,
                    None => Ok(()),
                },
            };
            if let Err(error) = result {
                failed = true;
                tracing::warn!(
                    "Failed to persist {} for event {}: {}",
                    key.for_event(self.event_id()),
                    self.event_id(),
                    error
                );
            }
        }
        inner.indicators.storage_error = failed;
    }

    fn publish(&self, inner: &Inner) {
        self.view_tx.send_replace(inner.view());
    }
}
