//! Assignment status state machine.
//!
//! ```text
//! not_started ──► in_progress ──► submitted ──► under_review ──► completed
//!      │                              ▲               │
//!      └──────────────────────────────┤               ▼
//!                                     └──────── needs_revision ──► in_progress
//! ```
//!
//! Buddies move work forward to `submitted`; mentors and managers own the
//! review half. `completed` is terminal.

use serde::{Deserialize, Serialize};

use crate::model::{AssignmentStatus, Role, SubmissionStatus};

use AssignmentStatus::{Completed, InProgress, NeedsRevision, NotStarted, Submitted, UnderReview};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("invalid status transition: {from} -> {to}")]
    Invalid { from: AssignmentStatus, to: AssignmentStatus },
    #[error("role {role} may not move an assignment from {from} to {to}")]
    Forbidden { role: Role, from: AssignmentStatus, to: AssignmentStatus },
}

// =============================================================================
// TRANSITIONS
// =============================================================================

/// Which side of the workflow drives a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Driver {
    Buddy,
    Reviewer,
}

fn driver(from: AssignmentStatus, to: AssignmentStatus) -> Option<Driver> {
    match (from, to) {
        (NotStarted, InProgress | Submitted) | (InProgress, Submitted) | (NeedsRevision, InProgress | Submitted) => {
            Some(Driver::Buddy)
        }
        (Submitted, UnderReview) | (UnderReview, NeedsRevision | Completed) => Some(Driver::Reviewer),
        _ => None,
    }
}

/// Whether `from -> to` is an edge of the state machine, regardless of actor.
#[must_use]
pub fn is_valid(from: AssignmentStatus, to: AssignmentStatus) -> bool {
    driver(from, to).is_some()
}

/// Statuses reachable from `from` in one step.
#[must_use]
pub fn next_states(from: AssignmentStatus) -> Vec<AssignmentStatus> {
    AssignmentStatus::ALL.into_iter().filter(|&to| is_valid(from, to)).collect()
}

/// Validate a transition performed by `actor`.
///
/// # Errors
///
/// Returns `Invalid` when the edge does not exist and `Forbidden` when it
/// exists but belongs to the other side of the workflow.
pub fn transition(from: AssignmentStatus, to: AssignmentStatus, actor: Role) -> Result<AssignmentStatus, TransitionError> {
    let Some(side) = driver(from, to) else {
        return Err(TransitionError::Invalid { from, to });
    };
    let allowed = match side {
        Driver::Buddy => actor == Role::Buddy,
        Driver::Reviewer => matches!(actor, Role::Mentor | Role::Manager),
    };
    if !allowed {
        return Err(TransitionError::Forbidden { role: actor, from, to });
    }
    Ok(to)
}

// =============================================================================
// REVIEW
// =============================================================================

/// Outcome a reviewer records on a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    RequestRevision,
}

impl ReviewDecision {
    /// Final assignment status after the decision.
    #[must_use]
    pub fn assignment_status(self) -> AssignmentStatus {
        match self {
            Self::Approve => Completed,
            Self::RequestRevision => NeedsRevision,
        }
    }

    /// Status the reviewed submission ends up in.
    #[must_use]
    pub fn submission_status(self) -> SubmissionStatus {
        match self {
            Self::Approve => SubmissionStatus::Approved,
            Self::RequestRevision => SubmissionStatus::NeedsRevision,
        }
    }
}

impl std::str::FromStr for ReviewDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "approve" | "approved" => Ok(Self::Approve),
            "request_revision" | "revise" | "needs_revision" => Ok(Self::RequestRevision),
            other => Err(format!("unknown review decision: {other}")),
        }
    }
}

/// Ordered statuses a reviewer must walk through to apply `decision`.
/// A `submitted` assignment passes through `under_review` first.
///
/// # Errors
///
/// Returns a `TransitionError` if the assignment is not awaiting review or
/// `reviewer` may not review.
pub fn review_path(
    current: AssignmentStatus,
    decision: ReviewDecision,
    reviewer: Role,
) -> Result<Vec<AssignmentStatus>, TransitionError> {
    let target = decision.assignment_status();
    let mut path = Vec::with_capacity(2);
    let mut at = current;
    if at == Submitted {
        at = transition(at, UnderReview, reviewer)?;
        path.push(at);
    }
    path.push(transition(at, target, reviewer)?);
    Ok(path)
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
