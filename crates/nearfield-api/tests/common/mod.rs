//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use nearfield_content::application::static_provider::StaticSceneProvider;
use nearfield_core::clock::Clock;
use nearfield_test_support::FixedClock;
use tower::ServiceExt;
use uuid::Uuid;

use nearfield_api::routes;
use nearfield_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build state serving the embedded demo story with a deterministic clock.
pub fn demo_state() -> AppState {
    AppState::with_static_provider(
        StaticSceneProvider::demo().unwrap(),
        fixed_clock(),
        Duration::from_secs(1),
        Duration::from_secs(3600),
    )
}

/// Build the full app router over `state`. Uses the same route structure
/// as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    routes::router().with_state(state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Advance a traversal of the demo story.
pub async fn advance(
    app: Router,
    session_id: Uuid,
    scene_id: &str,
    action: &str,
    turn_input: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    post_json(
        app,
        &format!("/api/v1/traversals/{session_id}/advance"),
        &serde_json::json!({
            "story_id": "demo-story",
            "scene_id": scene_id,
            "action": action,
            "turn_input": turn_input,
        }),
    )
    .await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
