//! A buddy's enrollment in a curriculum and the per-week, per-task progress.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::submission::Submission;

// =============================================================================
// STATUSES
// =============================================================================

/// Review-workflow state of a single task assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    NotStarted,
    InProgress,
    Submitted,
    UnderReview,
    NeedsRevision,
    Completed,
}

impl AssignmentStatus {
    pub const ALL: [Self; 6] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Submitted,
        Self::UnderReview,
        Self::NeedsRevision,
        Self::Completed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::NeedsRevision => "needs_revision",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("unknown assignment status: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Paused,
    Completed,
}

// =============================================================================
// PROGRESS RECORDS
// =============================================================================

/// Buddy-specific instance of a task template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub id: Uuid,
    pub buddy_id: Uuid,
    pub task_template_id: Uuid,
    pub title: String,
    pub status: AssignmentStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Every submitted version, oldest first.
    #[serde(default)]
    pub submissions: Vec<Submission>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuddyWeekProgress {
    pub id: Uuid,
    pub week_id: Uuid,
    pub week_number: u32,
    pub title: String,
    pub status: WeekStatus,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub progress_percentage: u8,
    #[serde(default)]
    pub assignments: Vec<TaskAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuddyCurriculum {
    pub id: Uuid,
    pub buddy_id: Uuid,
    pub curriculum_id: Uuid,
    pub curriculum_name: String,
    pub status: EnrollmentStatus,
    pub current_week: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub progress_percentage: u8,
    #[serde(default)]
    pub weeks: Vec<BuddyWeekProgress>,
}

impl BuddyCurriculum {
    /// Look up an assignment across all weeks.
    #[must_use]
    pub fn assignment(&self, id: Uuid) -> Option<&TaskAssignment> {
        self.weeks.iter().flat_map(|w| w.assignments.iter()).find(|a| a.id == id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub curriculum_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentStatusRequest {
    pub status: AssignmentStatus,
}
