//! Versioned submissions and their threaded feedback.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    UnderReview,
    NeedsRevision,
    Approved,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::NeedsRevision => "needs_revision",
            Self::Approved => "approved",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Link,
    File,
    Repository,
    Document,
}

/// Attachment on a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: Uuid,
    /// 1-based, strictly increasing per assignment.
    pub version: u32,
    #[serde(default)]
    pub description: String,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub resources: Vec<SubmissionResource>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub reviewed_by: Option<Uuid>,
}

/// One comment in a submission's feedback thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFeedback {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_role: Role,
    pub message: String,
    #[serde(default)]
    pub parent_feedback_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Body of `POST /api/assignments/{id}/submissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    pub version: u32,
    pub description: String,
    pub resources: Vec<SubmissionResource>,
}

/// Body of `POST /api/submissions/{id}/review`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmissionRequest {
    pub decision: crate::workflow::ReviewDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body of `POST /api/submissions/{id}/feedback`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_feedback_id: Option<Uuid>,
}
