//! Dashboard aggregates. The poller uses the `refresh_*` variants.

use super::{ApiClient, ApiError};
use crate::cache::{Tag, TagKind};
use crate::model::{Activity, DashboardStats};

pub const STATS_PATH: &str = "/api/dashboard/stats";
pub const ACTIVITY_PATH: &str = "/api/dashboard/activity";

impl ApiClient {
    /// `GET /api/dashboard/stats`, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.query(STATS_PATH, vec![Tag::list(TagKind::Dashboard)]).await
    }

    /// `GET /api/dashboard/activity`, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn recent_activity(&self) -> Result<Vec<Activity>, ApiError> {
        self.query(ACTIVITY_PATH, vec![Tag::list(TagKind::Dashboard)]).await
    }

    /// Always hits the network.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn refresh_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.refetch(STATS_PATH, vec![Tag::list(TagKind::Dashboard)]).await
    }

    /// Always hits the network.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn refresh_recent_activity(&self) -> Result<Vec<Activity>, ApiError> {
        self.refetch(ACTIVITY_PATH, vec![Tag::list(TagKind::Dashboard)]).await
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
