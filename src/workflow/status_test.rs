use super::*;

#[test]
fn buddy_moves_work_forward() {
    assert_eq!(transition(NotStarted, InProgress, Role::Buddy), Ok(InProgress));
    assert_eq!(transition(InProgress, Submitted, Role::Buddy), Ok(Submitted));
    assert_eq!(transition(NotStarted, Submitted, Role::Buddy), Ok(Submitted));
    assert_eq!(transition(NeedsRevision, InProgress, Role::Buddy), Ok(InProgress));
    assert_eq!(transition(NeedsRevision, Submitted, Role::Buddy), Ok(Submitted));
}

#[test]
fn reviewers_own_the_review_half() {
    for reviewer in [Role::Mentor, Role::Manager] {
        assert_eq!(transition(Submitted, UnderReview, reviewer), Ok(UnderReview));
        assert_eq!(transition(UnderReview, Completed, reviewer), Ok(Completed));
        assert_eq!(transition(UnderReview, NeedsRevision, reviewer), Ok(NeedsRevision));
    }
}

#[test]
fn buddy_cannot_review_own_work() {
    assert_eq!(
        transition(UnderReview, Completed, Role::Buddy),
        Err(TransitionError::Forbidden { role: Role::Buddy, from: UnderReview, to: Completed })
    );
    assert!(matches!(transition(Submitted, UnderReview, Role::Buddy), Err(TransitionError::Forbidden { .. })));
}

#[test]
fn mentor_cannot_submit_for_buddy() {
    assert!(matches!(transition(InProgress, Submitted, Role::Mentor), Err(TransitionError::Forbidden { .. })));
}

#[test]
fn completed_is_terminal() {
    assert!(next_states(Completed).is_empty());
    for to in AssignmentStatus::ALL {
        assert_eq!(
            transition(Completed, to, Role::Manager),
            Err(TransitionError::Invalid { from: Completed, to })
        );
    }
}

#[test]
fn self_transitions_are_rejected() {
    for status in AssignmentStatus::ALL {
        assert!(!is_valid(status, status), "{status} -> {status} should be invalid");
    }
}

#[test]
fn skipping_review_is_invalid() {
    assert!(!is_valid(Submitted, Completed));
    assert!(!is_valid(InProgress, Completed));
    assert!(!is_valid(NotStarted, UnderReview));
    assert!(!is_valid(UnderReview, Submitted));
}

#[test]
fn next_states_lists_every_edge() {
    assert_eq!(next_states(NotStarted), vec![InProgress, Submitted]);
    assert_eq!(next_states(UnderReview), vec![NeedsRevision, Completed]);
    assert_eq!(next_states(NeedsRevision), vec![InProgress, Submitted]);
}

#[test]
fn review_from_submitted_passes_through_under_review() {
    let path = review_path(Submitted, ReviewDecision::Approve, Role::Mentor).unwrap();
    assert_eq!(path, vec![UnderReview, Completed]);

    let path = review_path(UnderReview, ReviewDecision::RequestRevision, Role::Manager).unwrap();
    assert_eq!(path, vec![NeedsRevision]);
}

#[test]
fn review_rejected_when_not_awaiting_review() {
    assert!(matches!(
        review_path(InProgress, ReviewDecision::Approve, Role::Mentor),
        Err(TransitionError::Invalid { from: InProgress, to: Completed })
    ));
    assert!(matches!(
        review_path(Submitted, ReviewDecision::Approve, Role::Buddy),
        Err(TransitionError::Forbidden { .. })
    ));
}

#[test]
fn decision_maps_to_both_statuses() {
    assert_eq!(ReviewDecision::Approve.assignment_status(), Completed);
    assert_eq!(ReviewDecision::Approve.submission_status(), SubmissionStatus::Approved);
    assert_eq!(ReviewDecision::RequestRevision.assignment_status(), NeedsRevision);
    assert_eq!(ReviewDecision::RequestRevision.submission_status(), SubmissionStatus::NeedsRevision);
    assert_eq!("revise".parse::<ReviewDecision>().unwrap(), ReviewDecision::RequestRevision);
    assert_eq!(serde_json::to_value(ReviewDecision::RequestRevision).unwrap(), "request_revision");
}
