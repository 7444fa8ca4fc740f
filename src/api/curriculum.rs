//! Curriculum authoring and buddy progress endpoints.

use reqwest::Method;
use uuid::Uuid;

use super::{ApiClient, ApiError};
use crate::cache::{Tag, TagKind};
use crate::model::curriculum::{
    CreateCurriculumRequest, CreateTaskTemplateRequest, CreateWeekRequest, UpdateCurriculumRequest,
};
use crate::model::progress::{EnrollRequest, UpdateAssignmentStatusRequest};
use crate::model::{AssignmentStatus, BuddyCurriculum, Curriculum, CurriculumWeek, TaskAssignment, TaskTemplate};
use crate::roles::Action;
use crate::workflow::status;

// =============================================================================
// CURRICULA
// =============================================================================

impl ApiClient {
    /// `GET /api/curricula`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn curricula(&self) -> Result<Vec<Curriculum>, ApiError> {
        self.query("/api/curricula", vec![Tag::list(TagKind::Curriculum)]).await
    }

    /// `GET /api/curricula/{id}` with weeks and task templates embedded.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn curriculum(&self, id: Uuid) -> Result<Curriculum, ApiError> {
        self.query(&format!("/api/curricula/{id}"), vec![Tag::item(TagKind::Curriculum, id)]).await
    }

    /// `POST /api/curricula`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty name or zero weeks, `NotPermitted`
    /// for other roles, or a backend failure.
    pub async fn create_curriculum(&self, body: &CreateCurriculumRequest) -> Result<Curriculum, ApiError> {
        self.require(Action::ManageCurricula)?;
        if body.name.trim().is_empty() {
            return Err(ApiError::Validation("curriculum name is required".into()));
        }
        if body.duration_weeks == 0 {
            return Err(ApiError::Validation("curriculum must last at least one week".into()));
        }
        self.mutate(Method::POST, "/api/curricula", Some(body), &[Tag::list(TagKind::Curriculum)]).await
    }

    /// `PATCH /api/curricula/{id}`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` for other roles, or a backend failure.
    pub async fn update_curriculum(&self, id: Uuid, body: &UpdateCurriculumRequest) -> Result<Curriculum, ApiError> {
        self.require(Action::ManageCurricula)?;
        self.mutate(Method::PATCH, &format!("/api/curricula/{id}"), Some(body), &curriculum_tags(id)).await
    }

    /// `DELETE /api/curricula/{id}`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` for other roles, or a backend failure.
    pub async fn delete_curriculum(&self, id: Uuid) -> Result<(), ApiError> {
        self.require(Action::ManageCurricula)?;
        self.mutate::<(), serde_json::Value>(Method::DELETE, &format!("/api/curricula/{id}"), None, &curriculum_tags(id))
            .await?;
        Ok(())
    }

    /// `POST /api/curricula/{id}/publish`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the curriculum has no task templates yet,
    /// `NotPermitted` for other roles, or a backend failure.
    pub async fn publish_curriculum(&self, curriculum: &Curriculum) -> Result<Curriculum, ApiError> {
        self.require(Action::ManageCurricula)?;
        if curriculum.task_count() == 0 {
            return Err(ApiError::Validation("cannot publish a curriculum without tasks".into()));
        }
        let id = curriculum.id;
        self.mutate::<(), Curriculum>(Method::POST, &format!("/api/curricula/{id}/publish"), None, &curriculum_tags(id))
            .await
    }

    /// `POST /api/curricula/{id}/weeks`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a week number outside `1..=duration_weeks`,
    /// `NotPermitted` for other roles, or a backend failure.
    pub async fn add_week(&self, curriculum: &Curriculum, body: &CreateWeekRequest) -> Result<CurriculumWeek, ApiError> {
        self.require(Action::ManageCurricula)?;
        if body.week_number == 0 || body.week_number > curriculum.duration_weeks {
            return Err(ApiError::Validation(format!(
                "week number must be between 1 and {}",
                curriculum.duration_weeks
            )));
        }
        if curriculum.weeks.iter().any(|w| w.week_number == body.week_number) {
            return Err(ApiError::Validation(format!("week {} already exists", body.week_number)));
        }
        let id = curriculum.id;
        self.mutate(Method::POST, &format!("/api/curricula/{id}/weeks"), Some(body), &curriculum_tags(id)).await
    }

    /// `POST /api/curricula/{id}/weeks/{week_id}/tasks`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty title, `NotPermitted` for other
    /// roles, or a backend failure.
    pub async fn add_task_template(
        &self,
        curriculum_id: Uuid,
        week_id: Uuid,
        body: &CreateTaskTemplateRequest,
    ) -> Result<TaskTemplate, ApiError> {
        self.require(Action::ManageCurricula)?;
        if body.title.trim().is_empty() {
            return Err(ApiError::Validation("task title is required".into()));
        }
        self.mutate(
            Method::POST,
            &format!("/api/curricula/{curriculum_id}/weeks/{week_id}/tasks"),
            Some(body),
            &curriculum_tags(curriculum_id),
        )
        .await
    }
}

fn curriculum_tags(id: Uuid) -> [Tag; 2] {
    [Tag::item(TagKind::Curriculum, id), Tag::list(TagKind::Curriculum)]
}

// =============================================================================
// PROGRESS
// =============================================================================

impl ApiClient {
    /// `GET /api/buddies/{id}/curriculum`: enrollment with weeks and assignments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the buddy is not enrolled, or another `ApiError`.
    pub async fn buddy_curriculum(&self, buddy_id: Uuid) -> Result<BuddyCurriculum, ApiError> {
        self.query(&format!("/api/buddies/{buddy_id}/curriculum"), vec![Tag::item(TagKind::Progress, buddy_id)]).await
    }

    /// `POST /api/buddies/{id}/curriculum`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an unpublished curriculum, `NotPermitted`
    /// for other roles, or a backend failure.
    pub async fn enroll(&self, buddy_id: Uuid, curriculum: &Curriculum) -> Result<BuddyCurriculum, ApiError> {
        self.require(Action::ManageCurricula)?;
        if !curriculum.is_published {
            return Err(ApiError::Validation(format!("curriculum '{}' is not published", curriculum.name)));
        }
        let body = EnrollRequest { curriculum_id: curriculum.id };
        let enrollment: BuddyCurriculum = self
            .mutate(
                Method::POST,
                &format!("/api/buddies/{buddy_id}/curriculum"),
                Some(&body),
                &[Tag::item(TagKind::Progress, buddy_id), Tag::item(TagKind::Buddy, buddy_id), Tag::kind(TagKind::Dashboard)],
            )
            .await?;
        tracing::info!(%buddy_id, curriculum_id = %curriculum.id, "buddy enrolled");
        Ok(enrollment)
    }

    /// `PATCH /api/assignments/{id}/status`, validated against the workflow
    /// for the logged-in role first.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(Transition)` for an illegal move, or a backend failure.
    pub async fn update_assignment_status(
        &self,
        assignment: &TaskAssignment,
        to: AssignmentStatus,
    ) -> Result<TaskAssignment, ApiError> {
        let role = self.session()?.user.role;
        status::transition(assignment.status, to, role)?;

        let body = UpdateAssignmentStatusRequest { status: to };
        let updated: TaskAssignment = self
            .mutate(
                Method::PATCH,
                &format!("/api/assignments/{}/status", assignment.id),
                Some(&body),
                &progress_tags(assignment.buddy_id),
            )
            .await?;
        tracing::info!(assignment_id = %assignment.id, from = %assignment.status, %to, "assignment status changed");
        Ok(updated)
    }
}

pub(crate) fn progress_tags(buddy_id: Uuid) -> [Tag; 3] {
    [Tag::item(TagKind::Progress, buddy_id), Tag::item(TagKind::Buddy, buddy_id), Tag::kind(TagKind::Dashboard)]
}

#[cfg(test)]
#[path = "curriculum_test.rs"]
mod tests;
