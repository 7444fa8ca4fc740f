use super::*;
use crate::api::WorkflowError;
use crate::api::test_helpers::{client, serve};
use crate::model::{Role, TaskPriority, TaskStatus};
use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::routing::{get, patch};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn new_task(title: &str) -> CreateTaskRequest {
    CreateTaskRequest {
        title: title.into(),
        description: "Read chapter 3".into(),
        buddy_id: None,
        priority: TaskPriority::High,
        due_date: None,
    }
}

#[tokio::test]
async fn buddies_cannot_create_tasks() {
    let (api, _) = client("http://127.0.0.1:1", Some(Role::Buddy));
    assert!(matches!(
        api.create_task(&new_task("Docs")).await,
        Err(ApiError::Workflow(WorkflowError::NotPermitted { action: Action::ManageTasks, .. }))
    ));
}

#[tokio::test]
async fn blank_title_is_rejected_before_sending() {
    let (api, _) = client("http://127.0.0.1:1", Some(Role::Mentor));
    assert!(matches!(api.create_task(&new_task("  ")).await, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn creating_a_task_refreshes_the_list() {
    let lists = Arc::new(AtomicUsize::new(0));
    let counter = lists.clone();
    let router = Router::new().route(
        "/api/tasks",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!([]))
            }
        })
        .post(|Json(body): Json<Value>| async move {
            assert_eq!(body["priority"], "high");
            assert!(body.get("buddyId").is_none());
            Json(json!({
                "id": "0d3c6a43-4cf8-44cb-9a59-4f6f4c2a7f7e",
                "title": body["title"],
                "status": "pending",
                "priority": "high",
                "createdAt": "2026-03-01T09:00:00Z"
            }))
        }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Manager));

    api.tasks().await.unwrap();
    api.tasks().await.unwrap();
    assert_eq!(lists.load(Ordering::SeqCst), 1);

    let task = api.create_task(&new_task("Write tests")).await.unwrap();
    assert_eq!(task.title, "Write tests");

    api.tasks().await.unwrap();
    assert_eq!(lists.load(Ordering::SeqCst), 2);
}

fn task_json(id: Uuid, status: &str) -> Value {
    json!({
        "id": id,
        "title": "Write tests",
        "status": status,
        "priority": "medium",
        "createdAt": "2026-03-01T09:00:00Z"
    })
}

#[tokio::test]
async fn updating_a_task_patches_and_drops_task_and_dashboard_entries() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let recorder = seen.clone();
    let router = Router::new()
        .route("/api/tasks", get(|| async { Json(json!([])) }))
        .route(
            "/api/tasks/{id}",
            patch(move |Path(id): Path<Uuid>, Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    *recorder.lock().unwrap() = Some(body.clone());
                    Json(task_json(id, body["status"].as_str().unwrap_or("pending")))
                }
            }),
        )
        .route(
            "/api/dashboard/stats",
            get(|| async { Json(json!({ "totalMentors": 1, "totalBuddies": 2, "averageProgress": 50.0 })) }),
        );
    let base = serve(router).await;
    let (api, _) = client(&base, Some(Role::Mentor));
    api.tasks().await.unwrap();
    api.dashboard_stats().await.unwrap();
    assert_eq!(api.cache().len(), 2);

    let id = Uuid::new_v4();
    let updated = api
        .update_task(id, &UpdateTaskRequest { status: Some(TaskStatus::Completed), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(updated.id, id);
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(seen.lock().unwrap().clone().unwrap(), json!({ "status": "completed" }));
    assert!(api.cache().is_empty());
}

#[tokio::test]
async fn buddies_cannot_update_tasks() {
    let (api, _) = client("http://127.0.0.1:1", Some(Role::Buddy));
    assert!(matches!(
        api.update_task(Uuid::new_v4(), &UpdateTaskRequest::default()).await,
        Err(ApiError::Workflow(WorkflowError::NotPermitted { action: Action::ManageTasks, .. }))
    ));
}
