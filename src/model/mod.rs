//! Domain model — the wire contract of the Mentor-Buddy REST API.
//!
//! DESIGN
//! ======
//! Every type here mirrors a JSON shape returned or accepted by the backend.
//! Field names are camelCase on the wire, enum values snake_case, ids are
//! UUIDs and timestamps RFC 3339. No behavior lives here; rules over these
//! types are in `crate::workflow`.

pub mod curriculum;
pub mod dashboard;
pub mod people;
pub mod progress;
pub mod submission;
pub mod task;
pub mod user;

pub use curriculum::{Curriculum, CurriculumWeek, Difficulty, TaskTemplate};
pub use dashboard::{Activity, DashboardStats};
pub use people::{Buddy, BuddyStatus, Mentor, MentorStatus};
pub use progress::{AssignmentStatus, BuddyCurriculum, BuddyWeekProgress, EnrollmentStatus, TaskAssignment, WeekStatus};
pub use submission::{ResourceKind, Submission, SubmissionFeedback, SubmissionResource, SubmissionStatus};
pub use task::{Task, TaskPriority, TaskStatus};
pub use user::{AuthSession, Role, User};

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
