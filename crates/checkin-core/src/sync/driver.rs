//! Periodic push/pull triggers for a live scanner session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{CheckInOutcome, PullOutcome, PushOutcome, RosterSync, SyncError};
use crate::api::RosterApi;
use crate::db::LocalStore;
use crate::models::ParticipantId;

/// Drives a `RosterSync` with two independent timers.
///
/// Each tick spawns its operation as a separate task, so a stalled request
/// never delays the other trigger. Overlap within one trigger is rejected by
/// the in-flight guards inside `RosterSync`.
pub struct SyncDriver<A, S> {
    sync: Arc<RosterSync<A, S>>,
    push_interval: Duration,
    pull_interval: Duration,
}

/// Running timers; dropping the handle stops them.
///
/// Requests already in flight are left to finish on their own.
pub struct DriverHandle {
    shutdown: watch::Sender<bool>,
    timers: Vec<JoinHandle<()>>,
}

impl DriverHandle {
    pub async fn shutdown(mut self) {
        self.shutdown.send_replace(true);
        for timer in std::mem::take(&mut self.timers) {
            timer.await.ok();
        }
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

impl<A, S> SyncDriver<A, S>
where
    A: RosterApi + 'static,
    S: LocalStore + 'static,
{
    pub const fn new(
        sync: Arc<RosterSync<A, S>>,
        push_interval: Duration,
        pull_interval: Duration,
    ) -> Self {
        Self {
            sync,
            push_interval,
            pull_interval,
        }
    }

    pub const fn sync(&self) -> &Arc<RosterSync<A, S>> {
        &self.sync
    }

    /// Start the push and pull timers. The first tick fires after one period.
    pub fn start(&self) -> DriverHandle {
        let (shutdown, _) = watch::channel(false);

        let push_timer = spawn_timer(self.push_interval, shutdown.subscribe(), {
            let sync = Arc::clone(&self.sync);
            move || spawn_push(Arc::clone(&sync))
        });
        let pull_timer = spawn_timer(self.pull_interval, shutdown.subscribe(), {
            let sync = Arc::clone(&self.sync);
            move || spawn_pull(Arc::clone(&sync))
        });

        tracing::debug!(
            "Sync timers started (push every {:?}, pull every {:?})",
            self.push_interval,
            self.pull_interval
        );
        DriverHandle {
            shutdown,
            timers: vec![push_timer, pull_timer],
        }
    }

    /// Check in and kick off a best-effort upload without waiting for it.
    pub async fn check_in(&self, id: ParticipantId) -> Result<CheckInOutcome, SyncError> {
        let outcome = self.sync.check_in(id).await?;
        if matches!(outcome, CheckInOutcome::CheckedIn(_)) {
            spawn_push(Arc::clone(&self.sync));
        }
        Ok(outcome)
    }

    /// Scan-triggered check-in, uploading in the background on success.
    pub async fn handle_scan(&self, payload: &str) -> Result<CheckInOutcome, SyncError> {
        let outcome = self.sync.handle_scan(payload).await?;
        if matches!(outcome, CheckInOutcome::CheckedIn(_)) {
            spawn_push(Arc::clone(&self.sync));
        }
        Ok(outcome)
    }
}

fn spawn_timer(
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut fire: impl FnMut() + Send + 'static,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => fire(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}

fn spawn_push<A, S>(sync: Arc<RosterSync<A, S>>)
where
    A: RosterApi + 'static,
    S: LocalStore + 'static,
{
    tokio::spawn(async move {
        match sync.push().await {
            Ok(PushOutcome::InFlight) => tracing::debug!("Skipping push; previous upload running"),
            Ok(_) => {}
            Err(error) => tracing::debug!("Push will be retried: {}", error),
        }
    });
}

fn spawn_pull<A, S>(sync: Arc<RosterSync<A, S>>)
where
    A: RosterApi + 'static,
    S: LocalStore + 'static,
{
    tokio::spawn(async move {
        match sync.pull_updates().await {
            Ok(PullOutcome::InFlight) => tracing::debug!("Skipping pull; previous fetch running"),
            Ok(PullOutcome::Merged(_)) => {}
            Err(error) => tracing::debug!("Pull will be retried: {}", error),
        }
    });
}
