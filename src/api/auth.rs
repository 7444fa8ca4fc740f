//! Login, registration and the current-user endpoint.

use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::cache::{Tag, TagKind};
use crate::model::user::{LoginRequest, RegisterRequest};
use crate::model::{AuthSession, Role, User};

impl ApiClient {
    /// `POST /api/auth/login`: store the returned session.
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection, or a token-store failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let body = LoginRequest { email: email.trim().to_string(), password: password.to_string() };
        let session: AuthSession = self.mutate(Method::POST, "/api/auth/login", Some(&body), &[]).await?;
        self.store_session(&session)?;
        tracing::info!(user_id = %session.user.id, role = %session.user.role, "logged in");
        Ok(session)
    }

    /// `POST /api/auth/register`: create an account and store the session.
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection, or a token-store failure.
    pub async fn register(&self, email: &str, password: &str, name: &str, role: Role) -> Result<AuthSession, ApiError> {
        let body = RegisterRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            name: name.trim().to_string(),
            role,
        };
        let session: AuthSession = self.mutate(Method::POST, "/api/auth/register", Some(&body), &[]).await?;
        self.store_session(&session)?;
        Ok(session)
    }

    /// `GET /api/auth/me`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the token is missing or rejected.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.session()?;
        self.query("/api/auth/me", vec![Tag::list(TagKind::User)]).await
    }

    /// Forget the session locally. The backend keeps no logout state.
    pub fn logout(&self) {
        self.tokens().clear();
        self.cache().clear();
    }

    fn store_session(&self, session: &AuthSession) -> Result<(), ApiError> {
        self.cache().clear();
        self.tokens().save(session).map_err(|e| ApiError::TokenStore(e.to_string()))
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
