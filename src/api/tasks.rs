//! Ad-hoc task endpoints.

use reqwest::Method;
use uuid::Uuid;

use super::{ApiClient, ApiError};
use crate::cache::{Tag, TagKind};
use crate::model::Task;
use crate::model::task::{CreateTaskRequest, UpdateTaskRequest};
use crate::roles::Action;

impl ApiClient {
    /// `GET /api/tasks`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.query("/api/tasks", vec![Tag::list(TagKind::Task)]).await
    }

    /// `POST /api/tasks`. Managers and mentors.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for buddies, or a backend failure.
    pub async fn create_task(&self, body: &CreateTaskRequest) -> Result<Task, ApiError> {
        self.require(Action::ManageTasks)?;
        if body.title.trim().is_empty() {
            return Err(ApiError::Validation("task title is required".into()));
        }
        self.mutate(Method::POST, "/api/tasks", Some(body), &[Tag::list(TagKind::Task), Tag::kind(TagKind::Dashboard)])
            .await
    }

    /// `PATCH /api/tasks/{id}`. Managers and mentors.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for buddies, or a backend failure.
    pub async fn update_task(&self, id: Uuid, body: &UpdateTaskRequest) -> Result<Task, ApiError> {
        self.require(Action::ManageTasks)?;
        self.mutate(
            Method::PATCH,
            &format!("/api/tasks/{id}"),
            Some(body),
            &[Tag::item(TagKind::Task, id), Tag::list(TagKind::Task), Tag::kind(TagKind::Dashboard)],
        )
        .await
    }

    /// `DELETE /api/tasks/{id}`. Managers and mentors.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for buddies, or a backend failure.
    pub async fn delete_task(&self, id: Uuid) -> Result<(), ApiError> {
        self.require(Action::ManageTasks)?;
        self.mutate::<(), serde_json::Value>(
            Method::DELETE,
            &format!("/api/tasks/{id}"),
            None,
            &[Tag::kind(TagKind::Task), Tag::kind(TagKind::Dashboard)],
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;
