//! Submission and feedback endpoints of the review workflow.
//!
//! DESIGN
//! ======
//! Each write is checked against the workflow rules with the logged-in
//! role before it is sent:
//!
//! - submitting requires an open assignment and a consistent version
//!   history; the request carries the next version number;
//! - reviewing requires a reviewer role, an assignment awaiting review and
//!   the latest submission;
//! - feedback replies must point into the same submission.
//!
//! The history and feedback behind these checks are always fetched fresh;
//! the cache is only refreshed by them, never trusted.

use reqwest::Method;
use uuid::Uuid;

use super::curriculum::progress_tags;
use super::{ApiClient, ApiError, WorkflowError};
use crate::cache::{Tag, TagKind};
use crate::model::submission::{CreateFeedbackRequest, ReviewSubmissionRequest};
use crate::model::{AssignmentStatus, Submission, SubmissionFeedback, TaskAssignment};
use crate::roles::Action;
use crate::workflow::submission::{ensure_can_submit, latest, validate_history};
use crate::workflow::{FeedbackThread, NewSubmission, ReviewDecision, build_threads, review_path, status};

// =============================================================================
// SUBMISSIONS
// =============================================================================

impl ApiClient {
    /// `GET /api/assignments/{id}/submissions`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn submissions(&self, assignment_id: Uuid) -> Result<Vec<Submission>, ApiError> {
        let mut history: Vec<Submission> = self
            .query(&submissions_path(assignment_id), vec![Tag::item(TagKind::Submission, assignment_id)])
            .await?;
        history.sort_by_key(|s| s.version);
        Ok(history)
    }

    /// Version history straight from the backend, for checks that guard a write.
    async fn current_submissions(&self, assignment_id: Uuid) -> Result<Vec<Submission>, ApiError> {
        let mut history: Vec<Submission> = self
            .refetch(&submissions_path(assignment_id), vec![Tag::item(TagKind::Submission, assignment_id)])
            .await?;
        history.sort_by_key(|s| s.version);
        Ok(history)
    }

    /// `GET /api/submissions/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn submission(&self, id: Uuid) -> Result<Submission, ApiError> {
        self.query(&format!("/api/submissions/{id}"), vec![Tag::item(TagKind::Submission, id)]).await
    }

    /// `GET /api/submissions/review-queue`: submissions awaiting the
    /// logged-in reviewer.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` for buddies, or a backend failure.
    pub async fn review_queue(&self) -> Result<Vec<Submission>, ApiError> {
        self.require(Action::ReviewSubmission)?;
        let mut queue: Vec<Submission> =
            self.query("/api/submissions/review-queue", vec![Tag::list(TagKind::Submission)]).await?;
        queue.sort_by_key(|s| s.submitted_at);
        Ok(queue)
    }

    /// `POST /api/assignments/{id}/submissions` with the next version number.
    ///
    /// # Errors
    ///
    /// Returns `Workflow` when the assignment is closed, the history is
    /// inconsistent, or the input is invalid; otherwise a backend failure.
    pub async fn create_submission(&self, assignment: &TaskAssignment, work: NewSubmission) -> Result<Submission, ApiError> {
        let role = self.require(Action::SubmitWork)?;
        ensure_can_submit(assignment.status)?;
        status::transition(assignment.status, AssignmentStatus::Submitted, role)?;

        let history = self.current_submissions(assignment.id).await?;
        validate_history(&history)?;
        let body = work.into_request(&history)?;
        let version = body.version;

        let mut invalidates = vec![Tag::item(TagKind::Submission, assignment.id), Tag::list(TagKind::Submission)];
        invalidates.extend(progress_tags(assignment.buddy_id));
        let created: Submission = self
            .mutate(Method::POST, &submissions_path(assignment.id), Some(&body), &invalidates)
            .await?;

        if created.version != version {
            tracing::warn!(expected = version, got = created.version, "backend assigned a different version");
        }
        tracing::info!(assignment_id = %assignment.id, version = created.version, "submission created");
        Ok(created)
    }

    /// `POST /api/submissions/{id}/review`.
    ///
    /// # Errors
    ///
    /// Returns `Workflow` when the reviewer may not review, the assignment
    /// is not awaiting review, or `submission` is not its latest version.
    pub async fn review_submission(
        &self,
        assignment: &TaskAssignment,
        submission: &Submission,
        decision: ReviewDecision,
        comment: Option<String>,
    ) -> Result<Submission, ApiError> {
        let role = self.require(Action::ReviewSubmission)?;
        if submission.assignment_id != assignment.id {
            return Err(WorkflowError::WrongAssignment {
                submission: submission.id,
                expected: submission.assignment_id,
                actual: assignment.id,
            }
            .into());
        }
        let path = review_path(assignment.status, decision, role)?;

        let history = self.current_submissions(assignment.id).await?;
        if let Some(newest) = latest(&history) {
            if newest.version != submission.version {
                return Err(WorkflowError::StaleSubmission { version: submission.version, latest: newest.version }.into());
            }
        }

        let body = ReviewSubmissionRequest { decision, comment: comment.filter(|c| !c.trim().is_empty()) };
        let mut invalidates = vec![
            Tag::item(TagKind::Submission, submission.id),
            Tag::item(TagKind::Submission, assignment.id),
            Tag::list(TagKind::Submission),
            Tag::item(TagKind::Feedback, submission.id),
        ];
        invalidates.extend(progress_tags(assignment.buddy_id));
        let reviewed: Submission = self
            .mutate(Method::POST, &format!("/api/submissions/{}/review", submission.id), Some(&body), &invalidates)
            .await?;

        tracing::info!(
            submission_id = %submission.id,
            version = submission.version,
            ?decision,
            steps = path.len(),
            "submission reviewed"
        );
        Ok(reviewed)
    }
}

// =============================================================================
// FEEDBACK
// =============================================================================

impl ApiClient {
    /// `GET /api/submissions/{id}/feedback` as a flat list.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn feedback(&self, submission_id: Uuid) -> Result<Vec<SubmissionFeedback>, ApiError> {
        self.query(&feedback_path(submission_id), vec![Tag::item(TagKind::Feedback, submission_id)]).await
    }

    /// Feedback grouped into threads.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport or backend failure.
    pub async fn feedback_threads(&self, submission_id: Uuid) -> Result<Vec<FeedbackThread>, ApiError> {
        Ok(build_threads(self.feedback(submission_id).await?))
    }

    /// `POST /api/submissions/{id}/feedback`. `parent` makes it a reply.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(EmptyFeedback)` for a blank message, `Validation`
    /// when `parent` is not a comment on this submission, or a backend failure.
    pub async fn post_feedback(
        &self,
        submission_id: Uuid,
        message: &str,
        parent: Option<Uuid>,
    ) -> Result<SubmissionFeedback, ApiError> {
        self.require(Action::PostFeedback)?;
        let message = message.trim();
        if message.is_empty() {
            return Err(WorkflowError::EmptyFeedback.into());
        }
        if let Some(parent_id) = parent {
            let existing: Vec<SubmissionFeedback> =
                self.refetch(&feedback_path(submission_id), vec![Tag::item(TagKind::Feedback, submission_id)]).await?;
            if !existing.iter().any(|f| f.id == parent_id) {
                return Err(ApiError::Validation(format!("feedback {parent_id} is not on this submission")));
            }
        }

        let body = CreateFeedbackRequest { message: message.to_string(), parent_feedback_id: parent };
        self.mutate(
            Method::POST,
            &feedback_path(submission_id),
            Some(&body),
            &[Tag::item(TagKind::Feedback, submission_id), Tag::kind(TagKind::Dashboard)],
        )
        .await
    }
}

fn submissions_path(assignment_id: Uuid) -> String {
    format!("/api/assignments/{assignment_id}/submissions")
}

fn feedback_path(submission_id: Uuid) -> String {
    format!("/api/submissions/{submission_id}/feedback")
}

#[cfg(test)]
#[path = "submissions_test.rs"]
mod tests;
