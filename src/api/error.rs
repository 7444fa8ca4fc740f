//! API client errors.
//!
//! ERROR HANDLING
//! ==============
//! Every failure surfaces to the user as a one-line message
//! (`user_message`). A 401 additionally wipes the stored session before
//! `Unauthorized` is returned, so callers only need to send the user back
//! to login. A 401 from the login or register endpoints is a refused
//! credential instead and leaves the session alone. Nothing is retried.

use uuid::Uuid;

use crate::model::Role;
use crate::roles::Action;
use crate::workflow::{SubmissionInputError, SubmitError, TransitionError, VersionError};

/// Local workflow rule violations, raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Input(#[from] SubmissionInputError),
    #[error("role {role} is not allowed to {action:?}")]
    NotPermitted { role: Role, action: Action },
    #[error("submission v{version} is not the latest (v{latest})")]
    StaleSubmission { version: u32, latest: u32 },
    #[error("feedback message is empty")]
    EmptyFeedback,
    #[error("submission {submission} belongs to assignment {expected}, not {actual}")]
    WrongAssignment { submission: Uuid, expected: Uuid, actual: Uuid },
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session, or the backend rejected the token (HTTP 401).
    #[error("not authenticated")]
    Unauthorized,

    /// Login or registration was refused (HTTP 401 from `/api/auth/*`).
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The backend rejected the payload (HTTP 400/422).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Transport-level failure: DNS, connect, timeout.
    #[error("request failed: {0}")]
    Request(String),

    #[error("response decode failed: {0}")]
    Decode(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("token store: {0}")]
    TokenStore(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Whether the caller should send the user back to the login flow.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Short message suitable for a toast / CLI error line.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Your session has expired. Please log in again.".into(),
            Self::InvalidCredentials(_) => "Invalid email or password.".into(),
            Self::Forbidden(_) => "You do not have permission to do that.".into(),
            Self::NotFound(_) => "The requested item could not be found.".into(),
            Self::Validation(message) | Self::Server { message, .. } if !message.is_empty() => message.clone(),
            Self::Request(_) => "Could not reach the server. Check your connection.".into(),
            Self::Workflow(e) => e.to_string(),
            _ => "Something went wrong. Please try again.".into(),
        }
    }
}

impl From<TransitionError> for ApiError {
    fn from(e: TransitionError) -> Self {
        Self::Workflow(e.into())
    }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        Self::Workflow(e.into())
    }
}

impl From<VersionError> for ApiError {
    fn from(e: VersionError) -> Self {
        Self::Workflow(e.into())
    }
}

impl From<SubmissionInputError> for ApiError {
    fn from(e: SubmissionInputError) -> Self {
        Self::Workflow(e.into())
    }
}

/// Pull a human message out of an error body: `{"message": ..}`,
/// `{"error": ..}`, or the raw text.
#[must_use]
pub fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed.as_ref().and_then(|v| {
        ["message", "error"].iter().find_map(|key| v.get(*key).and_then(serde_json::Value::as_str).map(str::to_string))
    });
    field.unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
