//! Progress figures derived from task counts.
//!
//! The backend reports `progressPercentage` on weeks and enrollments; these
//! helpers recompute it from the underlying assignments so the client can
//! display fresh numbers after a local status change and detect drift.

use crate::model::{AssignmentStatus, BuddyWeekProgress, TaskAssignment, WeekStatus};

/// `completed / total` as a whole percentage, halves rounded up.
/// Zero when there is nothing to complete.
#[must_use]
pub fn percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed.min(total));
    let total = u64::from(total);
    let rounded = (completed * 200 + total) / (total * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

// =============================================================================
// WEEK
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRollup {
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
    pub status: WeekStatus,
}

impl WeekRollup {
    #[must_use]
    pub fn from_assignments(assignments: &[TaskAssignment]) -> Self {
        let statuses: Vec<AssignmentStatus> = assignments.iter().map(|a| a.status).collect();
        Self::from_statuses(&statuses)
    }

    #[must_use]
    pub fn from_statuses(statuses: &[AssignmentStatus]) -> Self {
        let total = u32::try_from(statuses.len()).unwrap_or(u32::MAX);
        let completed = u32::try_from(statuses.iter().filter(|&&s| s == AssignmentStatus::Completed).count())
            .unwrap_or(u32::MAX);

        let status = if total > 0 && completed == total {
            WeekStatus::Completed
        } else if statuses.iter().all(|&s| s == AssignmentStatus::NotStarted) {
            WeekStatus::NotStarted
        } else {
            WeekStatus::InProgress
        };

        Self { completed, total, percentage: percentage(completed, total), status }
    }
}

/// A week whose reported numbers disagree with its own counts or assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressDrift {
    pub week_number: u32,
    pub reported: u8,
    pub expected: u8,
}

/// Compare the reported percentage of `week` with what its assignments imply.
/// Falls back to the reported counts when assignments were not embedded.
#[must_use]
pub fn verify_reported(week: &BuddyWeekProgress) -> Option<ProgressDrift> {
    let expected = if week.assignments.is_empty() {
        percentage(week.completed_tasks, week.total_tasks)
    } else {
        WeekRollup::from_assignments(&week.assignments).percentage
    };
    (expected != week.progress_percentage).then_some(ProgressDrift {
        week_number: week.week_number,
        reported: week.progress_percentage,
        expected,
    })
}

// =============================================================================
// CURRICULUM
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurriculumRollup {
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
    /// First week (by number) not yet completed, or the last week when all are.
    pub current_week: u32,
}

impl CurriculumRollup {
    #[must_use]
    pub fn from_weeks(weeks: &[BuddyWeekProgress]) -> Self {
        let mut ordered: Vec<&BuddyWeekProgress> = weeks.iter().collect();
        ordered.sort_by_key(|w| w.week_number);

        let mut completed = 0u32;
        let mut total = 0u32;
        let mut current_week = None;
        for week in &ordered {
            let rollup = if week.assignments.is_empty() {
                WeekRollup {
                    completed: week.completed_tasks,
                    total: week.total_tasks,
                    percentage: percentage(week.completed_tasks, week.total_tasks),
                    status: week.status,
                }
            } else {
                WeekRollup::from_assignments(&week.assignments)
            };
            completed = completed.saturating_add(rollup.completed);
            total = total.saturating_add(rollup.total);
            if current_week.is_none() && rollup.status != WeekStatus::Completed {
                current_week = Some(week.week_number);
            }
        }

        let current_week = current_week.or_else(|| ordered.last().map(|w| w.week_number)).unwrap_or(1);
        Self { completed, total, percentage: percentage(completed, total), current_week }
    }
}

#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;
