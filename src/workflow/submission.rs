//! Submission versioning and input validation.
//!
//! Every assignment accumulates submissions numbered 1, 2, 3, ... in the
//! order they were made. A new version may only be created while the
//! assignment is open for work.

use reqwest::Url;

use crate::model::submission::CreateSubmissionRequest;
use crate::model::{AssignmentStatus, Submission, SubmissionResource};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("first submission has version {0}, expected 1")]
    NotStartingAtOne(u32),
    #[error("submission version {next} does not follow {previous}")]
    NotIncreasing { previous: u32, next: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("assignment is {0}; submissions are closed")]
    NotSubmittable(AssignmentStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionInputError {
    #[error("submission description is empty")]
    EmptyDescription,
    #[error("resource url is not an absolute http(s) url: {0}")]
    InvalidResourceUrl(String),
}

// =============================================================================
// VERSIONS
// =============================================================================

/// Version number for the next submission on an assignment.
#[must_use]
pub fn next_version(history: &[Submission]) -> u32 {
    history.iter().map(|s| s.version).max().map_or(1, |v| v + 1)
}

/// Highest-version submission, if any.
#[must_use]
pub fn latest(history: &[Submission]) -> Option<&Submission> {
    history.iter().max_by_key(|s| s.version)
}

/// Check that versions start at 1 and increase strictly in submission order.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_history(history: &[Submission]) -> Result<(), VersionError> {
    let mut ordered: Vec<&Submission> = history.iter().collect();
    ordered.sort_by_key(|s| s.submitted_at);

    let Some(first) = ordered.first() else {
        return Ok(());
    };
    if first.version != 1 {
        return Err(VersionError::NotStartingAtOne(first.version));
    }
    for pair in ordered.windows(2) {
        let (previous, next) = (pair[0].version, pair[1].version);
        if next <= previous {
            return Err(VersionError::NotIncreasing { previous, next });
        }
    }
    Ok(())
}

/// Submissions are accepted while work is open: not started, in progress,
/// or sent back for revision.
///
/// # Errors
///
/// Returns `NotSubmittable` for any other status.
pub fn ensure_can_submit(status: AssignmentStatus) -> Result<(), SubmitError> {
    match status {
        AssignmentStatus::NotStarted | AssignmentStatus::InProgress | AssignmentStatus::NeedsRevision => Ok(()),
        other => Err(SubmitError::NotSubmittable(other)),
    }
}

// =============================================================================
// NEW SUBMISSION
// =============================================================================

/// Work a buddy is about to submit, before a version is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub description: String,
    pub resources: Vec<SubmissionResource>,
}

impl NewSubmission {
    /// Validate the input and stamp it with the next version for `history`.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank description or a non-http(s) resource URL.
    pub fn into_request(self, history: &[Submission]) -> Result<CreateSubmissionRequest, SubmissionInputError> {
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(SubmissionInputError::EmptyDescription);
        }
        for resource in &self.resources {
            let valid = Url::parse(&resource.url).is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
            if !valid {
                return Err(SubmissionInputError::InvalidResourceUrl(resource.url.clone()));
            }
        }
        Ok(CreateSubmissionRequest { version: next_version(history), description, resources: self.resources })
    }
}

#[cfg(test)]
#[path = "submission_test.rs"]
mod tests;
