use super::*;
use time::macros::datetime;

fn mentor(name: &str, email: &str, status: MentorStatus, expertise: &[&str]) -> Mentor {
    Mentor {
        id: Uuid::new_v4(),
        name: name.into(),
        email: email.into(),
        domain_role: None,
        expertise: expertise.iter().map(|s| (*s).to_string()).collect(),
        status,
        buddy_count: 0,
        max_buddies: None,
        created_at: datetime!(2026-01-01 00:00:00 UTC),
    }
}

fn buddy(name: &str, status: BuddyStatus, mentor_id: Option<Uuid>) -> Buddy {
    Buddy {
        id: Uuid::new_v4(),
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
        domain_role: None,
        status,
        mentor_id,
        mentor_name: None,
        progress: 0,
        joined_at: datetime!(2026-01-01 00:00:00 UTC),
    }
}

fn task(title: &str, description: &str, status: TaskStatus, priority: TaskPriority) -> Task {
    Task {
        id: Uuid::new_v4(),
        title: title.into(),
        description: description.into(),
        buddy_id: None,
        mentor_id: None,
        status,
        priority,
        due_date: None,
        created_at: datetime!(2026-01-01 00:00:00 UTC),
    }
}

#[test]
fn empty_filter_keeps_everything_in_order() {
    let mentors = vec![
        mentor("Ada", "ada@example.com", MentorStatus::Active, &[]),
        mentor("Grace", "grace@example.com", MentorStatus::Inactive, &[]),
    ];
    let names: Vec<&str> = MentorFilter::default().apply(&mentors).iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Grace"]);
}

#[test]
fn mentor_search_matches_name_or_email_case_insensitively() {
    let mentors = vec![
        mentor("Ada Lovelace", "ada@example.com", MentorStatus::Active, &[]),
        mentor("Grace Hopper", "gh@navy.example", MentorStatus::Active, &[]),
    ];
    let by_name = MentorFilter { search: Some("  LOVE ".into()), ..Default::default() };
    assert_eq!(by_name.apply(&mentors).len(), 1);

    let by_email = MentorFilter { search: Some("navy".into()), ..Default::default() };
    assert_eq!(by_email.apply(&mentors)[0].name, "Grace Hopper");

    let blank = MentorFilter { search: Some("   ".into()), ..Default::default() };
    assert_eq!(blank.apply(&mentors).len(), 2);
}

#[test]
fn mentor_status_and_expertise_combine() {
    let mentors = vec![
        mentor("Ada", "a@x", MentorStatus::Active, &["Rust", "SQL"]),
        mentor("Bob", "b@x", MentorStatus::OnLeave, &["rust"]),
        mentor("Cy", "c@x", MentorStatus::Active, &["go"]),
    ];
    let filter = MentorFilter { status: Some(MentorStatus::Active), expertise: Some("rust".into()), ..Default::default() };
    let names: Vec<&str> = filter.apply(&mentors).iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Ada"]);
}

#[test]
fn buddy_filter_by_mentor_and_unassigned() {
    let mentor_id = Uuid::new_v4();
    let buddies = vec![
        buddy("Sam", BuddyStatus::Active, Some(mentor_id)),
        buddy("Kim", BuddyStatus::Active, None),
        buddy("Lee", BuddyStatus::Completed, Some(Uuid::new_v4())),
    ];

    let mine = BuddyFilter { mentor_id: Some(mentor_id), ..Default::default() };
    assert_eq!(mine.apply(&buddies)[0].name, "Sam");

    let unassigned = BuddyFilter { unassigned_only: true, ..Default::default() };
    let names: Vec<&str> = unassigned.apply(&buddies).iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Kim"]);

    let done = BuddyFilter { status: Some(BuddyStatus::Completed), search: Some("lee@".into()), ..Default::default() };
    assert_eq!(done.apply(&buddies).len(), 1);
}

#[test]
fn task_filter_searches_title_and_description() {
    let tasks = vec![
        task("Set up CI", "configure pipelines", TaskStatus::Pending, TaskPriority::High),
        task("Write docs", "README for the CI job", TaskStatus::Completed, TaskPriority::Low),
        task("Refactor", "split modules", TaskStatus::InProgress, TaskPriority::High),
    ];

    let ci = TaskFilter { search: Some("ci".into()), ..Default::default() };
    assert_eq!(ci.apply(&tasks).len(), 2);

    let urgent = TaskFilter { priority: Some(TaskPriority::High), status: Some(TaskStatus::InProgress), ..Default::default() };
    let titles: Vec<&str> = urgent.apply(&tasks).iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Refactor"]);
}

#[test]
fn assignment_filter_by_status() {
    let make = |status| TaskAssignment {
        id: Uuid::new_v4(),
        buddy_id: Uuid::nil(),
        task_template_id: Uuid::nil(),
        title: "t".into(),
        status,
        due_date: None,
        submissions: Vec::new(),
        created_at: datetime!(2026-01-01 00:00:00 UTC),
    };
    let assignments = vec![make(AssignmentStatus::Submitted), make(AssignmentStatus::Completed)];
    let pending = AssignmentFilter { status: Some(AssignmentStatus::Submitted) };
    assert_eq!(pending.apply(&assignments).len(), 1);
    assert_eq!(AssignmentFilter::default().apply(&assignments).len(), 2);
}
