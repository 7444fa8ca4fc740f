use super::*;
use crate::model::AssignmentStatus;

#[test]
fn message_field_preferred() {
    assert_eq!(error_message(r#"{"message":"email taken","error":"Conflict"}"#), "email taken");
}

#[test]
fn error_field_used_when_no_message() {
    assert_eq!(error_message(r#"{"error":"mentor is full"}"#), "mentor is full");
}

#[test]
fn raw_text_used_for_non_json() {
    assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    assert_eq!(error_message(r#"{"detail":"x"}"#), r#"{"detail":"x"}"#);
}

#[test]
fn only_unauthorized_is_auth_failure() {
    assert!(ApiError::Unauthorized.is_auth_failure());
    assert!(!ApiError::Forbidden("x".into()).is_auth_failure());
    assert!(!ApiError::InvalidCredentials("bad password".into()).is_auth_failure());
}

#[test]
fn user_messages_surface_backend_text() {
    assert_eq!(ApiError::Validation("name is required".into()).user_message(), "name is required");
    assert_eq!(
        ApiError::Server { status: 500, message: String::new() }.user_message(),
        "Something went wrong. Please try again."
    );
    assert!(ApiError::Unauthorized.user_message().contains("log in"));
}

#[test]
fn workflow_errors_convert_and_describe_themselves() {
    let err: ApiError = TransitionError::Invalid { from: AssignmentStatus::Completed, to: AssignmentStatus::InProgress }.into();
    assert!(matches!(err, ApiError::Workflow(WorkflowError::Transition(_))));
    assert_eq!(err.user_message(), "invalid status transition: completed -> in_progress");
}
