//! Configuration parsed from environment variables.
//!
//! `main` loads a `.env` file first (via `dotenvy`), so every value can come
//! from either the process environment or that file. CLI flags override the
//! API URL and token file.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CACHE_KEEP_SECS: u64 = 60;
pub const DEFAULT_POLL_STATS_SECS: u64 = 30;
pub const DEFAULT_POLL_ACTIVITY_SECS: u64 = 60;

const TOKEN_FILE_NAME: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid url for {key}: {value:?}")]
    InvalidUrl { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub stats: Duration,
    pub activity: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the REST backend, without a trailing slash.
    pub api_url: String,
    /// Where the CLI persists the auth session.
    pub token_file: PathBuf,
    /// Target of the keep-alive ping.
    pub health_url: String,
    /// Shared secret for the keep-alive ping (outbound and inbound).
    pub cron_secret: Option<String>,
    pub port: u16,
    pub timeouts: HttpTimeouts,
    pub cache_keep: Duration,
    pub poll: PollIntervals,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `MENTOR_BUDDY_API_URL`: default `http://localhost:3000`
    /// - `MENTOR_BUDDY_TOKEN_FILE`: default `<config dir>/mentor-buddy/session.json`
    /// - `BACKEND_HEALTH_URL`: default `<api url>/health`
    /// - `CRON_SECRET`: unset disables the bearer header and inbound check
    /// - `PORT`: default 3000
    /// - `HTTP_REQUEST_TIMEOUT_SECS` / `HTTP_CONNECT_TIMEOUT_SECS`: default 30 / 10
    /// - `CACHE_KEEP_SECS`: default 60, 0 disables caching
    /// - `POLL_STATS_SECS` / `POLL_ACTIVITY_SECS`: default 30 / 60
    ///
    /// # Errors
    ///
    /// Returns an error if a set value cannot be parsed, or if a timeout or
    /// poll interval is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = normalize_url("MENTOR_BUDDY_API_URL", env_string("MENTOR_BUDDY_API_URL"))?
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let health_url = normalize_url("BACKEND_HEALTH_URL", env_string("BACKEND_HEALTH_URL"))?
            .unwrap_or_else(|| default_health_url(&api_url));
        let token_file = env_string("MENTOR_BUDDY_TOKEN_FILE").map_or_else(default_token_file, PathBuf::from);

        Ok(Self {
            api_url,
            token_file,
            health_url,
            cron_secret: env_string("CRON_SECRET"),
            port: env_parse("PORT", DEFAULT_PORT)?,
            timeouts: HttpTimeouts {
                request: env_secs("HTTP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
                connect: env_secs("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
            },
            cache_keep: Duration::from_secs(env_parse("CACHE_KEEP_SECS", DEFAULT_CACHE_KEEP_SECS)?),
            poll: PollIntervals {
                stats: env_secs("POLL_STATS_SECS", DEFAULT_POLL_STATS_SECS)?,
                activity: env_secs("POLL_ACTIVITY_SECS", DEFAULT_POLL_ACTIVITY_SECS)?,
            },
        })
    }

    /// Replace the API URL, re-deriving the health URL if it was defaulted.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an http(s) URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let was_default = self.health_url == default_health_url(&self.api_url);
        let Some(url) = normalize_url("--api-url", Some(url.to_string()))? else {
            return Ok(self);
        };
        if was_default {
            self.health_url = default_health_url(&url);
        }
        self.api_url = url;
        Ok(self)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env_string(key) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

/// Whole seconds that must be at least 1.
fn env_secs(key: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env_parse(key, default)? {
        0 => Err(ConfigError::InvalidValue { key, value: "0".to_string() }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn normalize_url(key: &'static str, raw: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) || reqwest::Url::parse(trimmed).is_err() {
        return Err(ConfigError::InvalidUrl { key, value: raw });
    }
    Ok(Some(trimmed.to_string()))
}

fn default_health_url(api_url: &str) -> String {
    format!("{api_url}/health")
}

fn default_token_file() -> PathBuf {
    dirs::config_dir().unwrap_or_else(std::env::temp_dir).join("mentor-buddy").join(TOKEN_FILE_NAME)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
