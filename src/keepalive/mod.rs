//! Keep-alive pinger. Keeps an idle backend from being suspended.
//!
//! SYSTEM CONTEXT
//! ==============
//! A scheduler (cron, or `mentor-buddy keep-alive --every`) calls
//! `GET /api/keep-alive`, which pings the backend health URL with the shared
//! secret as a bearer token. The outcome is always reported as a
//! `KeepAliveReport` with HTTP 200; only a missing or wrong inbound secret
//! is rejected.

use std::time::Instant;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use serde::Serialize;
use time::OffsetDateTime;

/// Outcome of one ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Backend answered 2xx.
    Healthy,
    /// Backend answered with any other status.
    Unhealthy,
    /// No HTTP response at all.
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepAliveReport {
    pub ok: bool,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_status: Option<u16>,
    pub target: String,
    pub latency_ms: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub checked_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ping `target` once. Never fails; transport errors become `Unreachable`.
pub async fn check_backend(http: &reqwest::Client, target: &str, secret: Option<&str>) -> KeepAliveReport {
    let checked_at = OffsetDateTime::now_utc();
    let started = Instant::now();

    let mut request = http.get(target);
    if let Some(secret) = secret {
        request = request.bearer_auth(secret);
    }
    let result = request.send().await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (status, backend_status, error) = match result {
        Ok(response) if response.status().is_success() => (HealthStatus::Healthy, Some(response.status().as_u16()), None),
        Ok(response) => {
            let code = response.status().as_u16();
            (HealthStatus::Unhealthy, Some(code), Some(format!("backend answered HTTP {code}")))
        }
        Err(e) => (HealthStatus::Unreachable, None, Some(e.to_string())),
    };

    match status {
        HealthStatus::Healthy => tracing::info!(url = target, latency_ms, "backend healthy"),
        _ => tracing::warn!(url = target, latency_ms, ?status, error = error.as_deref().unwrap_or(""), "backend not healthy"),
    }

    KeepAliveReport {
        ok: status == HealthStatus::Healthy,
        status,
        backend_status,
        target: target.to_string(),
        latency_ms,
        checked_at,
        error,
    }
}

/// Whether an inbound request may trigger a ping. Open when no secret is set.
#[must_use]
pub fn authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token.trim() == secret)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
