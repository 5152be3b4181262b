//! Key-value cache mirroring scanner state per event

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Database;
use crate::error::Result;
use crate::models::{timestamp, Attendee, EventDetails, EventId, Roster};
use crate::state::RosterTotals;

/// Durable string store used to mirror session state.
pub trait LocalStore: Send + Sync {
    /// Read a value, `None` when the key was never written
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Insert or overwrite a value
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;

    /// Delete a value if present
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// libSQL implementation of `LocalStore`
pub struct LibSqlLocalStore {
    db: Database,
}

impl LibSqlLocalStore {
    /// Create a new store on top of an opened database
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

impl LocalStore for LibSqlLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .db
            .connection()
            .query("SELECT value FROM local_storage WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get::<String>(0)?))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO local_storage (key, value, updated_at) VALUES (?, ?, ?)",
                libsql::params![key, value, now],
            )
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.db
            .connection()
            .execute("DELETE FROM local_storage WHERE key = ?", [key])
            .await?;
        Ok(())
    }
}

/// Entries kept for every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    Attendees,
    Counters,
    EventDetails,
    MyCheckIns,
    Pending,
    Watermark,
}

impl CacheKey {
    pub const ALL: [Self; 6] = [
        Self::Attendees,
        Self::Counters,
        Self::EventDetails,
        Self::MyCheckIns,
        Self::Pending,
        Self::Watermark,
    ];

    const fn prefix(self) -> &'static str {
        match self {
            Self::Attendees => "attendees",
            Self::Counters => "counters",
            Self::EventDetails => "eventdetails",
            Self::MyCheckIns => "mycheckins",
            Self::Pending => "pending",
            Self::Watermark => "watermark",
        }
    }

    /// Storage key for this entry, e.g. `attendees-1024`
    pub fn for_event(self, event_id: &EventId) -> String {
        format!("{}-{}", self.prefix(), event_id)
    }
}

/// Typed view of the cache entries belonging to one event.
pub struct EventCache<S> {
    store: S,
    event_id: EventId,
}

impl<S: LocalStore> EventCache<S> {
    pub const fn new(store: S, event_id: EventId) -> Self {
        Self { store, event_id }
    }

    pub const fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub async fn load_roster(&self) -> Result<Option<Roster>> {
        self.load_json(CacheKey::Attendees).await
    }

    pub async fn save_roster(&self, roster: &Roster) -> Result<()> {
        self.save_json(CacheKey::Attendees, roster).await
    }

    pub async fn load_totals(&self) -> Result<Option<RosterTotals>> {
        self.load_json(CacheKey::Counters).await
    }

    pub async fn save_totals(&self, totals: &RosterTotals) -> Result<()> {
        self.save_json(CacheKey::Counters, totals).await
    }

    pub async fn load_details(&self) -> Result<Option<EventDetails>> {
        self.load_json(CacheKey::EventDetails).await
    }

    pub async fn save_details(&self, details: &EventDetails) -> Result<()> {
        self.save_json(CacheKey::EventDetails, details).await
    }

    /// Local check-in counter; unreadable values count as zero
    pub async fn load_my_check_ins(&self) -> Result<u64> {
        let raw = self.store.get(&self.key(CacheKey::MyCheckIns)).await?;
        Ok(raw
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(0))
    }

    pub async fn save_my_check_ins(&self, count: u64) -> Result<()> {
        self.store
            .set(&self.key(CacheKey::MyCheckIns), &count.to_string())
            .await
    }

    pub async fn load_pending(&self) -> Result<Vec<Attendee>> {
        Ok(self
            .load_json(CacheKey::Pending)
            .await?
            .unwrap_or_default())
    }

    pub async fn save_pending(&self, pending: &[Attendee]) -> Result<()> {
        self.save_json(CacheKey::Pending, pending).await
    }

    pub async fn load_watermark(&self) -> Result<Option<DateTime<Utc>>> {
        let raw = self.store.get(&self.key(CacheKey::Watermark)).await?;
        Ok(raw.as_deref().and_then(timestamp::parse))
    }

    pub async fn save_watermark(&self, watermark: &DateTime<Utc>) -> Result<()> {
        self.store
            .set(&self.key(CacheKey::Watermark), &timestamp::format(watermark))
            .await
    }

    /// Drop every entry of this event.
    pub async fn clear(&self) -> Result<()> {
        for key in CacheKey::ALL {
            self.store.remove(&self.key(key)).await?;
        }
        tracing::info!("Cleared local cache for event {}", self.event_id);
        Ok(())
    }

    fn key(&self, key: CacheKey) -> String {
        key.for_event(&self.event_id)
    }

    async fn load_json<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>> {
        let Some(raw) = self.store.get(&self.key(key)).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                tracing::warn!(
                    "Ignoring unreadable cache entry {}: {}",
                    self.key(key),
                    error
                );
                Ok(None)
            }
        }
    }

    async fn save_json<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        self.store.set(&self.key(key), &serialized).await
    }
}
