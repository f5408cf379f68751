//! Routes describing the content being served.

use axum::extract::State;
use axum::{Json, Router, routing::get};

use crate::state::{AppState, ContentInfo};

/// GET /
async fn describe_content(State(state): State<AppState>) -> Json<ContentInfo> {
    Json(ContentInfo::clone(&state.content))
}

/// Returns the router for content metadata.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(describe_content))
}
