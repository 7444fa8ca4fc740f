//! Client-side list filtering for mentors, buddies, tasks and assignments.
//!
//! Search text is trimmed and matched case-insensitively as a substring.
//! Every filter preserves the input order.

use uuid::Uuid;

use crate::model::{
    AssignmentStatus, Buddy, BuddyStatus, Mentor, MentorStatus, Task, TaskAssignment, TaskPriority, TaskStatus,
};

fn needle(search: Option<&str>) -> Option<String> {
    search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase)
}

fn contains_any(needle: Option<&str>, haystacks: &[&str]) -> bool {
    needle.is_none_or(|n| haystacks.iter().any(|h| h.to_lowercase().contains(n)))
}

// =============================================================================
// MENTORS
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MentorFilter {
    pub search: Option<String>,
    pub status: Option<MentorStatus>,
    /// Exact (case-insensitive) expertise tag.
    pub expertise: Option<String>,
}

impl MentorFilter {
    #[must_use]
    pub fn matches(&self, mentor: &Mentor) -> bool {
        let search = needle(self.search.as_deref());
        contains_any(search.as_deref(), &[mentor.name.as_str(), mentor.email.as_str()])
            && self.status.is_none_or(|s| mentor.status == s)
            && self
                .expertise
                .as_deref()
                .is_none_or(|tag| mentor.expertise.iter().any(|e| e.eq_ignore_ascii_case(tag.trim())))
    }

    #[must_use]
    pub fn apply<'a>(&self, mentors: &'a [Mentor]) -> Vec<&'a Mentor> {
        mentors.iter().filter(|m| self.matches(m)).collect()
    }
}

// =============================================================================
// BUDDIES
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct BuddyFilter {
    pub search: Option<String>,
    pub status: Option<BuddyStatus>,
    pub mentor_id: Option<Uuid>,
    pub unassigned_only: bool,
}

impl BuddyFilter {
    #[must_use]
    pub fn matches(&self, buddy: &Buddy) -> bool {
        let search = needle(self.search.as_deref());
        contains_any(search.as_deref(), &[buddy.name.as_str(), buddy.email.as_str()])
            && self.status.is_none_or(|s| buddy.status == s)
            && self.mentor_id.is_none_or(|id| buddy.mentor_id == Some(id))
            && (!self.unassigned_only || buddy.mentor_id.is_none())
    }

    #[must_use]
    pub fn apply<'a>(&self, buddies: &'a [Buddy]) -> Vec<&'a Buddy> {
        buddies.iter().filter(|b| self.matches(b)).collect()
    }
}

// =============================================================================
// TASKS
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub buddy_id: Option<Uuid>,
}

impl TaskFilter {
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let search = needle(self.search.as_deref());
        contains_any(search.as_deref(), &[task.title.as_str(), task.description.as_str()])
            && self.status.is_none_or(|s| task.status == s)
            && self.priority.is_none_or(|p| task.priority == p)
            && self.buddy_id.is_none_or(|id| task.buddy_id == Some(id))
    }

    #[must_use]
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

// =============================================================================
// ASSIGNMENTS
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub status: Option<AssignmentStatus>,
}

impl AssignmentFilter {
    #[must_use]
    pub fn matches(&self, assignment: &TaskAssignment) -> bool {
        self.status.is_none_or(|s| assignment.status == s)
    }

    #[must_use]
    pub fn apply<'a>(&self, assignments: &'a [TaskAssignment]) -> Vec<&'a TaskAssignment> {
        assignments.iter().filter(|a| self.matches(a)).collect()
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
