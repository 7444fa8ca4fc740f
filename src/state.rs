//! Shared state of the keep-alive service.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! carries the ping target, the shared secret and one outbound HTTP client
//! reused across requests.

use std::sync::Arc;

use crate::config::{AppConfig, HttpTimeouts};

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub health_url: Arc<str>,
    pub cron_secret: Option<Arc<str>>,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(health_url: &str, cron_secret: Option<&str>, timeouts: HttpTimeouts) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeouts.request).connect_timeout(timeouts.connect).build()?;
        Ok(Self { http, health_url: Arc::from(health_url), cron_secret: cron_secret.map(Arc::from) })
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.health_url, config.cron_secret.as_deref(), config.timeouts)
    }

    #[must_use]
    pub fn secret(&self) -> Option<&str> {
        self.cron_secret.as_deref()
    }
}
