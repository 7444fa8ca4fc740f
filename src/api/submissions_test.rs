use super::*;
use crate::api::test_helpers::{client, serve};
use crate::model::{ResourceKind, Role, SubmissionResource, SubmissionStatus};
use crate::workflow::SubmitError;
use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::macros::datetime;

fn submission_json(assignment_id: Uuid, version: u32, status: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "assignmentId": assignment_id,
        "version": version,
        "description": format!("attempt {version}"),
        "status": status,
        "resources": [],
        "submittedAt": format!("2026-03-0{version}T10:00:00Z")
    })
}

fn assignment(status: AssignmentStatus) -> TaskAssignment {
    TaskAssignment {
        id: Uuid::new_v4(),
        buddy_id: Uuid::new_v4(),
        task_template_id: Uuid::new_v4(),
        title: "Ship the feature".into(),
        status,
        due_date: None,
        submissions: Vec::new(),
        created_at: datetime!(2026-03-01 00:00:00 UTC),
    }
}

fn feedback_json(submission_id: Uuid, id: Uuid, parent: Option<Uuid>, minute: u32, message: &str) -> Value {
    json!({
        "id": id,
        "submissionId": submission_id,
        "authorId": Uuid::new_v4(),
        "authorName": "Alex",
        "authorRole": "mentor",
        "message": message,
        "parentFeedbackId": parent,
        "createdAt": format!("2026-03-05T10:{minute:02}:00Z")
    })
}

#[tokio::test]
async fn resubmission_carries_next_version() {
    let task = assignment(AssignmentStatus::NeedsRevision);
    let assignment_id = task.id;
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let recorder = seen.clone();
    let router = Router::new().route(
        "/api/assignments/{id}/submissions",
        get(move || async move { Json(json!([submission_json(assignment_id, 1, "needs_revision")])) }).post(
            move |Path(id): Path<Uuid>, Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    assert_eq!(id, assignment_id);
                    *recorder.lock().unwrap() = Some(body.clone());
                    let mut created = submission_json(assignment_id, 2, "pending");
                    created["description"] = body["description"].clone();
                    Json(created)
                }
            },
        ),
    );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Buddy));

    let work = NewSubmission {
        description: "Addressed review comments".into(),
        resources: vec![SubmissionResource {
            kind: ResourceKind::Repository,
            url: "https://github.com/sam/feature".into(),
            title: Some("PR".into()),
        }],
    };
    let created = api.create_submission(&task, work).await.unwrap();
    assert_eq!(created.version, 2);
    assert_eq!(created.status, SubmissionStatus::Pending);

    let body = seen.lock().unwrap().clone().unwrap();
    assert_eq!(body["version"], 2);
    assert_eq!(body["resources"][0]["type"], "repository");
}

#[tokio::test]
async fn submitting_rereads_history_behind_the_cache() {
    let task = assignment(AssignmentStatus::NeedsRevision);
    let assignment_id = task.id;
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = reads.clone();
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let recorder = seen.clone();
    let router = Router::new().route(
        "/api/assignments/{id}/submissions",
        get(move || {
            let counter = counter.clone();
            async move {
                let mut history = vec![submission_json(assignment_id, 1, "needs_revision")];
                // Another session resubmits after the first read.
                if counter.fetch_add(1, Ordering::SeqCst) > 0 {
                    history.push(submission_json(assignment_id, 2, "needs_revision"));
                }
                Json(Value::Array(history))
            }
        })
        .post(move |Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = Some(body.clone());
                Json(submission_json(assignment_id, 3, "pending"))
            }
        }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Buddy));

    assert_eq!(api.submissions(assignment_id).await.unwrap().len(), 1);
    let work = NewSubmission { description: "Third try".into(), resources: Vec::new() };
    let created = api.create_submission(&task, work).await.unwrap();

    assert_eq!(created.version, 3);
    assert_eq!(seen.lock().unwrap().clone().unwrap()["version"], 3);
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn closed_assignment_cannot_be_submitted() {
    let (api, _) = client("http://127.0.0.1:1", Some(Role::Buddy));
    let task = assignment(AssignmentStatus::UnderReview);
    let work = NewSubmission { description: "again".into(), resources: Vec::new() };
    let err = api.create_submission(&task, work).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Workflow(WorkflowError::Submit(SubmitError::NotSubmittable(AssignmentStatus::UnderReview)))
    ));
}

#[tokio::test]
async fn mentors_do_not_submit_work() {
    let (api, _) = client("http://127.0.0.1:1", Some(Role::Mentor));
    let task = assignment(AssignmentStatus::InProgress);
    let work = NewSubmission { description: "x".into(), resources: Vec::new() };
    assert!(matches!(
        api.create_submission(&task, work).await,
        Err(ApiError::Workflow(WorkflowError::NotPermitted { action: Action::SubmitWork, .. }))
    ));
}

#[tokio::test]
async fn review_posts_decision_for_latest_version() {
    let task = assignment(AssignmentStatus::Submitted);
    let assignment_id = task.id;
    let latest_json = submission_json(assignment_id, 2, "pending");
    let history = json!([submission_json(assignment_id, 1, "needs_revision"), latest_json.clone()]);
    let router = Router::new()
        .route("/api/assignments/{id}/submissions", get(move || async move { Json(history) }))
        .route(
            "/api/submissions/{id}/review",
            post(move |Json(body): Json<Value>| {
                let mut reviewed = latest_json.clone();
                async move {
                    assert_eq!(body["decision"], "approve");
                    assert_eq!(body["comment"], "Great work");
                    reviewed["status"] = json!("approved");
                    Json(reviewed)
                }
            }),
        );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Mentor));

    let history = api.submissions(assignment_id).await.unwrap();
    let newest = history.last().unwrap().clone();
    let reviewed = api
        .review_submission(&task, &newest, ReviewDecision::Approve, Some("Great work".into()))
        .await
        .unwrap();
    assert_eq!(reviewed.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn reviewing_an_old_version_is_refused() {
    let task = assignment(AssignmentStatus::UnderReview);
    let assignment_id = task.id;
    let router = Router::new().route(
        "/api/assignments/{id}/submissions",
        get(move || async move {
            Json(json!([submission_json(assignment_id, 1, "needs_revision"), submission_json(assignment_id, 2, "pending")]))
        }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Manager));

    let history = api.submissions(assignment_id).await.unwrap();
    let err = api
        .review_submission(&task, &history[0], ReviewDecision::RequestRevision, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Workflow(WorkflowError::StaleSubmission { version: 1, latest: 2 })));
}

#[tokio::test]
async fn review_notices_version_submitted_after_cached_read() {
    let task = assignment(AssignmentStatus::Submitted);
    let assignment_id = task.id;
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = reads.clone();
    let router = Router::new().route(
        "/api/assignments/{id}/submissions",
        get(move || {
            let counter = counter.clone();
            async move {
                let mut history = vec![submission_json(assignment_id, 1, "needs_revision")];
                if counter.fetch_add(1, Ordering::SeqCst) > 0 {
                    history.push(submission_json(assignment_id, 2, "pending"));
                }
                Json(Value::Array(history))
            }
        }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Mentor));

    let cached = api.submissions(assignment_id).await.unwrap();
    let err = api.review_submission(&task, &cached[0], ReviewDecision::Approve, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Workflow(WorkflowError::StaleSubmission { version: 1, latest: 2 })));
}

#[tokio::test]
async fn review_refuses_submission_from_another_assignment() {
    let (api, _) = client("http://127.0.0.1:1", Some(Role::Mentor));
    let task = assignment(AssignmentStatus::Submitted);
    let other_assignment = Uuid::new_v4();
    let foreign: Submission = serde_json::from_value(submission_json(other_assignment, 1, "pending")).unwrap();

    let err = api.review_submission(&task, &foreign, ReviewDecision::Approve, None).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Workflow(WorkflowError::WrongAssignment { expected, actual, .. })
            if expected == other_assignment && actual == task.id
    ));
}

#[tokio::test]
async fn single_submission_is_fetched_by_id() {
    let assignment_id = Uuid::new_v4();
    let stored = submission_json(assignment_id, 4, "approved");
    let id: Uuid = stored["id"].as_str().unwrap().parse().unwrap();
    let router = Router::new().route(
        "/api/submissions/{id}",
        get(move |Path(requested): Path<Uuid>| {
            let stored = stored.clone();
            async move {
                assert_eq!(requested, id);
                Json(stored)
            }
        }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Buddy));

    let got = api.submission(id).await.unwrap();
    assert_eq!(got.id, id);
    assert_eq!(got.version, 4);
    assert_eq!(got.assignment_id, assignment_id);
    assert_eq!(got.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn buddies_cannot_review() {
    let (api, _) = client("http://127.0.0.1:1", Some(Role::Buddy));
    assert!(matches!(api.review_queue().await, Err(ApiError::Workflow(WorkflowError::NotPermitted { .. }))));
}

#[tokio::test]
async fn feedback_is_grouped_into_threads() {
    let submission_id = Uuid::new_v4();
    let root = Uuid::new_v4();
    let reply = Uuid::new_v4();
    let list = json!([
        feedback_json(submission_id, reply, Some(root), 5, "fixed"),
        feedback_json(submission_id, root, None, 1, "please fix naming"),
        feedback_json(submission_id, Uuid::new_v4(), None, 9, "approved"),
    ]);
    let router = Router::new().route("/api/submissions/{id}/feedback", get(move || async move { Json(list) }));
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Buddy));

    let threads = api.feedback_threads(submission_id).await.unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].comment.id, root);
    assert_eq!(threads[0].replies[0].comment.id, reply);
    assert_eq!(threads[1].comment.message, "approved");
}

#[tokio::test]
async fn reply_must_target_existing_comment() {
    let submission_id = Uuid::new_v4();
    let router = Router::new().route("/api/submissions/{id}/feedback", get(|| async { Json(json!([])) }));
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Buddy));

    let err = api.post_feedback(submission_id, "thanks!", Some(Uuid::new_v4())).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let err = api.post_feedback(submission_id, "   ", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Workflow(WorkflowError::EmptyFeedback)));
}

#[tokio::test]
async fn reply_may_target_comment_posted_after_cached_read() {
    let submission_id = Uuid::new_v4();
    let root = Uuid::new_v4();
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = reads.clone();
    let router = Router::new().route(
        "/api/submissions/{id}/feedback",
        get(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Json(json!([]))
                } else {
                    Json(json!([feedback_json(submission_id, root, None, 1, "please rename")]))
                }
            }
        })
        .post(move |Json(body): Json<Value>| async move {
            assert_eq!(body["parentFeedbackId"], json!(root));
            Json(feedback_json(submission_id, Uuid::new_v4(), Some(root), 2, "renamed"))
        }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Buddy));

    assert!(api.feedback_threads(submission_id).await.unwrap().is_empty());
    let reply = api.post_feedback(submission_id, "renamed", Some(root)).await.unwrap();
    assert_eq!(reply.parent_feedback_id, Some(root));
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn posting_feedback_refreshes_thread() {
    let submission_id = Uuid::new_v4();
    let stored: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let reader = stored.clone();
    let writer = stored.clone();
    let router = Router::new().route(
        "/api/submissions/{id}/feedback",
        get(move || {
            let reader = reader.clone();
            async move { Json(Value::Array(reader.lock().unwrap().clone())) }
        })
        .post(move |Json(body): Json<Value>| {
            let writer = writer.clone();
            async move {
                let mut list = writer.lock().unwrap();
                let minute = u32::try_from(list.len()).unwrap();
                let parent = body["parentFeedbackId"].as_str().and_then(|s| s.parse::<Uuid>().ok());
                let item = feedback_json(
                    submission_id,
                    Uuid::new_v4(),
                    parent,
                    minute,
                    body["message"].as_str().unwrap_or_default(),
                );
                list.push(item.clone());
                Json(item)
            }
        }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Mentor));

    assert!(api.feedback_threads(submission_id).await.unwrap().is_empty());
    let first = api.post_feedback(submission_id, "Looks close", None).await.unwrap();
    api.post_feedback(submission_id, "One more nit", Some(first.id)).await.unwrap();

    let threads = api.feedback_threads(submission_id).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].reply_count(), 1);
}
