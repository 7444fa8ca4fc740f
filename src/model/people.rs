//! Mentors and buddies.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// MENTOR
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentorStatus {
    Active,
    Inactive,
    OnLeave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Job domain the mentor coaches in (e.g. "frontend", "qa").
    #[serde(default)]
    pub domain_role: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    pub status: MentorStatus,
    #[serde(default)]
    pub buddy_count: u32,
    #[serde(default)]
    pub max_buddies: Option<u32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Mentor {
    /// Whether another buddy can be assigned without exceeding `max_buddies`.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.status == MentorStatus::Active && self.max_buddies.map_or(true, |max| self.buddy_count < max)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMentorRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_role: Option<String>,
    pub expertise: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_buddies: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMentorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expertise: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MentorStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_buddies: Option<u32>,
}

// =============================================================================
// BUDDY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuddyStatus {
    Active,
    Inactive,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buddy {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub domain_role: Option<String>,
    pub status: BuddyStatus,
    #[serde(default)]
    pub mentor_id: Option<Uuid>,
    #[serde(default)]
    pub mentor_name: Option<String>,
    /// Overall progress percentage as reported by the backend.
    #[serde(default)]
    pub progress: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuddyRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBuddyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BuddyStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignMentorRequest {
    pub mentor_id: Uuid,
}
