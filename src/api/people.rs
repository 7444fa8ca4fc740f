//! Mentor and buddy endpoints.

use reqwest::Method;
use uuid::Uuid;

use super::{ApiClient, ApiError};
use crate::cache::{Tag, TagKind};
use crate::model::people::{
    AssignMentorRequest, CreateBuddyRequest, CreateMentorRequest, UpdateBuddyRequest, UpdateMentorRequest,
};
use crate::model::{Buddy, Mentor};
use crate::roles::Action;

// =============================================================================
// MENTORS
// =============================================================================

impl ApiClient {
    /// `GET /api/mentors`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn mentors(&self) -> Result<Vec<Mentor>, ApiError> {
        self.query("/api/mentors", vec![Tag::list(TagKind::Mentor)]).await
    }

    /// `GET /api/mentors/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn mentor(&self, id: Uuid) -> Result<Mentor, ApiError> {
        self.query(&format!("/api/mentors/{id}"), vec![Tag::item(TagKind::Mentor, id)]).await
    }

    /// `GET /api/mentors/{id}/buddies`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn mentor_buddies(&self, mentor_id: Uuid) -> Result<Vec<Buddy>, ApiError> {
        self.query(
            &format!("/api/mentors/{mentor_id}/buddies"),
            vec![Tag::item(TagKind::Mentor, mentor_id), Tag::list(TagKind::Buddy)],
        )
        .await
    }

    /// `POST /api/mentors`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for other roles, or a backend failure.
    pub async fn create_mentor(&self, body: &CreateMentorRequest) -> Result<Mentor, ApiError> {
        self.require(Action::ManageMentors)?;
        self.mutate(Method::POST, "/api/mentors", Some(body), &[Tag::list(TagKind::Mentor), Tag::kind(TagKind::Dashboard)])
            .await
    }

    /// `PATCH /api/mentors/{id}`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for other roles, or a backend failure.
    pub async fn update_mentor(&self, id: Uuid, body: &UpdateMentorRequest) -> Result<Mentor, ApiError> {
        self.require(Action::ManageMentors)?;
        self.mutate(
            Method::PATCH,
            &format!("/api/mentors/{id}"),
            Some(body),
            &[Tag::item(TagKind::Mentor, id), Tag::list(TagKind::Mentor)],
        )
        .await
    }

    /// `DELETE /api/mentors/{id}`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for other roles, or a backend failure.
    pub async fn delete_mentor(&self, id: Uuid) -> Result<(), ApiError> {
        self.require(Action::ManageMentors)?;
        self.mutate::<(), serde_json::Value>(
            Method::DELETE,
            &format!("/api/mentors/{id}"),
            None,
            &[Tag::kind(TagKind::Mentor), Tag::kind(TagKind::Buddy), Tag::kind(TagKind::Dashboard)],
        )
        .await?;
        Ok(())
    }
}

// =============================================================================
// BUDDIES
// =============================================================================

impl ApiClient {
    /// `GET /api/buddies`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn buddies(&self) -> Result<Vec<Buddy>, ApiError> {
        self.query("/api/buddies", vec![Tag::list(TagKind::Buddy)]).await
    }

    /// `GET /api/buddies/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn buddy(&self, id: Uuid) -> Result<Buddy, ApiError> {
        self.query(&format!("/api/buddies/{id}"), vec![Tag::item(TagKind::Buddy, id)]).await
    }

    /// `POST /api/buddies`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for other roles, or a backend failure.
    pub async fn create_buddy(&self, body: &CreateBuddyRequest) -> Result<Buddy, ApiError> {
        self.require(Action::ManageBuddies)?;
        let mut invalidates = vec![Tag::list(TagKind::Buddy), Tag::kind(TagKind::Dashboard)];
        if let Some(mentor_id) = body.mentor_id {
            invalidates.push(Tag::item(TagKind::Mentor, mentor_id));
            invalidates.push(Tag::list(TagKind::Mentor));
        }
        self.mutate(Method::POST, "/api/buddies", Some(body), &invalidates).await
    }

    /// `PATCH /api/buddies/{id}`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for other roles, or a backend failure.
    pub async fn update_buddy(&self, id: Uuid, body: &UpdateBuddyRequest) -> Result<Buddy, ApiError> {
        self.require(Action::ManageBuddies)?;
        self.mutate(
            Method::PATCH,
            &format!("/api/buddies/{id}"),
            Some(body),
            &[Tag::item(TagKind::Buddy, id), Tag::list(TagKind::Buddy)],
        )
        .await
    }

    /// `DELETE /api/buddies/{id}`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for other roles, or a backend failure.
    pub async fn delete_buddy(&self, id: Uuid) -> Result<(), ApiError> {
        self.require(Action::ManageBuddies)?;
        self.mutate::<(), serde_json::Value>(
            Method::DELETE,
            &format!("/api/buddies/{id}"),
            None,
            &[Tag::kind(TagKind::Buddy), Tag::list(TagKind::Mentor), Tag::kind(TagKind::Dashboard)],
        )
        .await?;
        Ok(())
    }

    /// `POST /api/buddies/{id}/assign-mentor`. Managers only.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(NotPermitted)` for other roles, or a backend failure.
    pub async fn assign_mentor(&self, buddy_id: Uuid, mentor_id: Uuid) -> Result<Buddy, ApiError> {
        self.require(Action::AssignMentor)?;
        let body = AssignMentorRequest { mentor_id };
        let buddy: Buddy = self
            .mutate(
                Method::POST,
                &format!("/api/buddies/{buddy_id}/assign-mentor"),
                Some(&body),
                &[Tag::kind(TagKind::Buddy), Tag::kind(TagKind::Mentor), Tag::kind(TagKind::Dashboard)],
            )
            .await?;
        tracing::info!(%buddy_id, %mentor_id, "mentor assigned");
        Ok(buddy)
    }
}

#[cfg(test)]
#[path = "people_test.rs"]
mod tests;
