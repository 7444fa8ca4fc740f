//! Role-based permissions and navigation entry points.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend is the authority on access control. These checks let the
//! client refuse an action locally and pick the right landing page after
//! login, mirroring what the backend will accept.

use crate::model::Role;

/// An operation gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageMentors,
    ManageBuddies,
    ManageCurricula,
    AssignMentor,
    ManageTasks,
    ViewDashboard,
    ReviewSubmission,
    SubmitWork,
    PostFeedback,
}

impl Role {
    #[must_use]
    pub fn can(self, action: Action) -> bool {
        match self {
            Self::Manager => action != Action::SubmitWork,
            Self::Mentor => matches!(
                action,
                Action::ViewDashboard | Action::ManageTasks | Action::ReviewSubmission | Action::PostFeedback
            ),
            Self::Buddy => matches!(action, Action::SubmitWork | Action::PostFeedback),
        }
    }

    /// Landing route after login.
    #[must_use]
    pub fn home_path(self) -> &'static str {
        match self {
            Self::Manager => "/dashboard",
            Self::Mentor => "/mentor",
            Self::Buddy => "/buddy",
        }
    }
}

#[cfg(test)]
#[path = "roles_test.rs"]
mod tests;
