//! Curricula: a named learning path of weeks, each holding task templates.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Reusable task definition inside a week. Instantiated per buddy as a
/// `TaskAssignment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub id: Uuid,
    pub week_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub estimated_hours: Option<f32>,
    /// Reference links handed to the buddy with the task.
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumWeek {
    pub id: Uuid,
    pub curriculum_id: Uuid,
    pub week_number: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<TaskTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain_role: Option<String>,
    pub duration_weeks: u32,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub weeks: Vec<CurriculumWeek>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Curriculum {
    /// Total task templates across every week.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.weeks.iter().map(|w| w.tasks.len()).sum()
    }

    /// Weeks ordered by `week_number`, tasks within each by `order`.
    #[must_use]
    pub fn ordered_weeks(&self) -> Vec<CurriculumWeek> {
        let mut weeks = self.weeks.clone();
        weeks.sort_by_key(|w| w.week_number);
        for week in &mut weeks {
            week.tasks.sort_by_key(|t| t.order);
        }
        weeks
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCurriculumRequest {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_role: Option<String>,
    pub duration_weeks: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCurriculumRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_weeks: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWeekRequest {
    pub week_number: u32,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskTemplateRequest {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f32>,
    pub resources: Vec<String>,
    pub order: u32,
}
