//! REST client for the Mentor-Buddy backend.
//!
//! ARCHITECTURE
//! ============
//! `ApiClient` is the single gateway to the backend. It attaches the bearer
//! token from the `TokenStore`, caches GET responses in a `QueryCache` and
//! invalidates tags after successful mutations. Endpoint groups live in
//! sibling modules as further `impl ApiClient` blocks.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses map to `ApiError` by status. A 401 clears both the
//! stored session and the cache before returning `Unauthorized`. Workflow
//! checks run before the request and fail with `ApiError::Workflow`.

pub mod auth;
pub mod curriculum;
pub mod dashboard;
pub mod error;
pub mod people;
pub mod submissions;
pub mod tasks;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use error::{ApiError, WorkflowError};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};

use crate::cache::{QueryCache, Tag};
use crate::config::{AppConfig, HttpTimeouts};
use crate::model::{AuthSession, Role};
use crate::roles::Action;

// =============================================================================
// CLIENT
// =============================================================================

struct Inner {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    cache: QueryCache,
}

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Build a client for `base_url` (no trailing slash required).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        timeouts: HttpTimeouts,
        cache_keep: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                tokens,
                cache: QueryCache::new(cache_keep),
            }),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.timeouts, config.cache_keep, tokens)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    #[must_use]
    pub fn tokens(&self) -> &dyn TokenStore {
        self.inner.tokens.as_ref()
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Session of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when no session is stored.
    pub fn session(&self) -> Result<AuthSession, ApiError> {
        self.inner.tokens.load().ok_or(ApiError::Unauthorized)
    }

    /// Role of the logged-in user, checked against `action`.
    pub(crate) fn require(&self, action: Action) -> Result<Role, ApiError> {
        let role = self.session()?.user.role;
        if !role.can(action) {
            return Err(WorkflowError::NotPermitted { role, action }.into());
        }
        Ok(role)
    }

    // =========================================================================
    // REQUEST PLUMBING
    // =========================================================================

    /// Cached GET. A fresh cache entry short-circuits the request.
    pub(crate) async fn query<T: DeserializeOwned>(&self, path: &str, tags: Vec<Tag>) -> Result<T, ApiError> {
        if let Some(hit) = self.inner.cache.get(path) {
            tracing::trace!(path, "cache hit");
            return decode(hit);
        }
        self.refetch(path, tags).await
    }

    /// GET that bypasses the cache but still refreshes it.
    pub(crate) async fn refetch<T: DeserializeOwned>(&self, path: &str, tags: Vec<Tag>) -> Result<T, ApiError> {
        let value = self.send(Method::GET, path, None).await?;
        self.inner.cache.insert(path, value.clone(), tags);
        decode(value)
    }

    /// Non-GET request; on success drops every cache entry matched by `invalidates`.
    pub(crate) async fn mutate<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        invalidates: &[Tag],
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ApiError::Decode(format!("request encode: {e}")))?;
        let value = self.send(method, path, body).await?;
        self.inner.cache.invalidate(invalidates);
        decode(value)
    }

    async fn send(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}{path}", self.inner.base_url);
        let mut request = self.inner.http.request(method.clone(), &url);
        if let Some(token) = self.inner.tokens.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, %method, path, "request failed");
            ApiError::Request(e.to_string())
        })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(self.status_error(status, path, &text));
        }
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn status_error(&self, status: u16, path: &str, body: &str) -> ApiError {
        let message = error::error_message(body);
        match status {
            401 if CREDENTIAL_PATHS.contains(&path) => {
                tracing::info!(path, "credentials refused");
                ApiError::InvalidCredentials(message)
            }
            401 => {
                tracing::info!(path, "session rejected; clearing stored credentials");
                self.inner.tokens.clear();
                self.inner.cache.clear();
                ApiError::Unauthorized
            }
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(path.to_string()),
            400 | 422 => ApiError::Validation(message),
            _ => {
                tracing::warn!(status, path, %message, "server error");
                ApiError::Server { status, message }
            }
        }
    }
}

/// Endpoints where a 401 means the submitted email or password was wrong.
const CREDENTIAL_PATHS: [&str; 2] = ["/api/auth/login", "/api/auth/register"];

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
