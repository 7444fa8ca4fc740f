//! Workflow rules over the domain model.
//!
//! DESIGN
//! ======
//! The backend owns persistence, but the client enforces the review workflow
//! before it sends anything: status transitions must follow the state
//! machine, submission versions must keep increasing, and progress figures
//! must agree with task counts. Everything here is pure and synchronous.

pub mod feedback;
pub mod filter;
pub mod progress;
pub mod status;
pub mod submission;

pub use feedback::{FeedbackThread, build_threads};
pub use filter::{AssignmentFilter, BuddyFilter, MentorFilter, TaskFilter};
pub use progress::{CurriculumRollup, WeekRollup, percentage};
pub use status::{ReviewDecision, TransitionError, review_path, transition};
pub use submission::{NewSubmission, SubmissionInputError, SubmitError, VersionError, next_version};
