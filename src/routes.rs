//! Router assembly for the keep-alive service.

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::keepalive::{self, KeepAliveReport};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/keep-alive", get(keep_alive))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /api/keep-alive`: ping the backend and report. 200 unless the
/// inbound secret is wrong.
async fn keep_alive(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !keepalive::authorized(&headers, state.secret()) {
        tracing::warn!("keep-alive called without a valid secret");
        return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "error": "unauthorized" }))).into_response();
    }
    let report: KeepAliveReport = keepalive::check_backend(&state.http, &state.health_url, state.secret()).await;
    Json(report).into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
