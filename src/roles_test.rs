use super::*;

#[test]
fn manager_can_do_everything_but_submit() {
    for action in [
        Action::ManageMentors,
        Action::ManageBuddies,
        Action::ManageCurricula,
        Action::AssignMentor,
        Action::ManageTasks,
        Action::ViewDashboard,
        Action::ReviewSubmission,
        Action::PostFeedback,
    ] {
        assert!(Role::Manager.can(action), "manager should be allowed {action:?}");
    }
    assert!(!Role::Manager.can(Action::SubmitWork));
}

#[test]
fn mentor_reviews_but_does_not_manage_people() {
    assert!(Role::Mentor.can(Action::ReviewSubmission));
    assert!(Role::Mentor.can(Action::PostFeedback));
    assert!(Role::Mentor.can(Action::ViewDashboard));
    assert!(!Role::Mentor.can(Action::ManageMentors));
    assert!(!Role::Mentor.can(Action::AssignMentor));
    assert!(!Role::Mentor.can(Action::SubmitWork));
}

#[test]
fn buddy_only_submits_and_comments() {
    assert!(Role::Buddy.can(Action::SubmitWork));
    assert!(Role::Buddy.can(Action::PostFeedback));
    assert!(!Role::Buddy.can(Action::ReviewSubmission));
    assert!(!Role::Buddy.can(Action::ViewDashboard));
}

#[test]
fn each_role_has_its_own_home() {
    assert_eq!(Role::Manager.home_path(), "/dashboard");
    assert_eq!(Role::Mentor.home_path(), "/mentor");
    assert_eq!(Role::Buddy.home_path(), "/buddy");
}
