//! Dashboard poller — fixed-interval refresh of stats and activity.
//!
//! DESIGN
//! ======
//! A background task owns two intervals, one per dashboard query. Each tick
//! refetches from the backend (bypassing the cache) and publishes the merged
//! result on a `watch` channel. A failed fetch keeps the previous value. An
//! auth failure ends the task, since every later tick would fail the same way.

use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{ApiClient, ApiError};
use crate::config::PollIntervals;
use crate::model::{Activity, DashboardStats};

/// Latest dashboard data seen by the poller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub stats: Option<DashboardStats>,
    pub activity: Vec<Activity>,
    pub stats_updated_at: Option<OffsetDateTime>,
    pub activity_updated_at: Option<OffsetDateTime>,
}

impl DashboardSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats_updated_at.is_none() && self.activity_updated_at.is_none()
    }
}

pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Spawn the poller. Both queries fire immediately, then on their intervals.
/// The task ends on an auth failure or once every receiver is dropped.
/// Intervals shorter than `MIN_INTERVAL` are raised to it.
pub fn spawn_dashboard_poller(
    client: ApiClient,
    intervals: PollIntervals,
) -> (JoinHandle<()>, watch::Receiver<DashboardSnapshot>) {
    let (tx, rx) = watch::channel(DashboardSnapshot::default());
    let handle = tokio::spawn(async move {
        let mut stats_tick = tokio::time::interval(intervals.stats.max(MIN_INTERVAL));
        let mut activity_tick = tokio::time::interval(intervals.activity.max(MIN_INTERVAL));
        stats_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        activity_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let outcome = tokio::select! {
                _ = stats_tick.tick() => refresh_stats(&client, &tx).await,
                _ = activity_tick.tick() => refresh_activity(&client, &tx).await,
                () = tx.closed() => break,
            };
            if let Err(e) = outcome {
                if e.is_auth_failure() {
                    tracing::info!("dashboard poller stopped: session rejected");
                    break;
                }
                tracing::warn!(error = %e, "dashboard poll failed; keeping previous data");
            }
        }
    });
    (handle, rx)
}

async fn refresh_stats(client: &ApiClient, tx: &watch::Sender<DashboardSnapshot>) -> Result<(), ApiError> {
    let stats = client.refresh_dashboard_stats().await?;
    tx.send_modify(|snapshot| {
        snapshot.stats = Some(stats);
        snapshot.stats_updated_at = Some(OffsetDateTime::now_utc());
    });
    Ok(())
}

async fn refresh_activity(client: &ApiClient, tx: &watch::Sender<DashboardSnapshot>) -> Result<(), ApiError> {
    let activity = client.refresh_recent_activity().await?;
    tracing::debug!(count = activity.len(), "activity refreshed");
    tx.send_modify(|snapshot| {
        snapshot.activity = activity;
        snapshot.activity_updated_at = Some(OffsetDateTime::now_utc());
    });
    Ok(())
}

#[cfg(test)]
#[path = "poll_test.rs"]
mod tests;
