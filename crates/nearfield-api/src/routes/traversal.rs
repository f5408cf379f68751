//! Routes for advancing and inspecting traversals.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use nearfield_core::action::ActionType;
use nearfield_core::model::{AdvanceResult, Clue};
use nearfield_narrative::application::query_handlers::{self, EntityView, TraversalView};
use nearfield_narrative::domain::commands::Advance;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for POST /.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Fresh session to advance traversals under.
    pub session_id: Uuid,
}

/// Request body for POST /{session_id}/advance.
#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    /// Story to advance.
    pub story_id: String,
    /// Scene the action is aimed at.
    pub scene_id: String,
    /// The action to take.
    pub action: ActionType,
    /// Player text for `INTERACT`.
    #[serde(default)]
    pub turn_input: Option<String>,
}

/// Clues handed off during one traversal.
#[derive(Debug, Serialize)]
pub struct TraversalCluesResponse {
    /// The session queried.
    pub session_id: Uuid,
    /// The story queried.
    pub story_id: String,
    /// Clues in hand-off order.
    pub clues: Vec<Clue>,
}

/// POST /
///
/// No traversal exists until the first `LOAD_SCENE` under the session.
async fn open_session() -> (StatusCode, Json<SessionResponse>) {
    let session_id = Uuid::now_v7();
    info!(%session_id, "opened session");
    (StatusCode::CREATED, Json(SessionResponse { session_id }))
}

/// POST /{session_id}/advance
#[instrument(
    skip(state, request),
    fields(story_id = %request.story_id, scene_id = %request.scene_id, action = %request.action)
)]
async fn advance(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<AdvanceResult>, ApiError> {
    let command = Advance {
        correlation_id: Uuid::new_v4(),
        session_id,
        story_id: request.story_id,
        scene_id: request.scene_id,
        action: request.action,
        turn_input: request.turn_input,
    };

    info!(correlation_id = %command.correlation_id, "handling advance command");

    let result = state.engine.advance(&command).await?;
    Ok(Json(result))
}

/// GET /{session_id}/stories/{story_id}
#[instrument(skip(state))]
async fn get_traversal(
    State(state): State<AppState>,
    Path((session_id, story_id)): Path<(Uuid, String)>,
) -> Result<Json<TraversalView>, ApiError> {
    let view = query_handlers::get_traversal(&state.engine, session_id, &story_id).await?;
    Ok(Json(view))
}

/// GET /{session_id}/stories/{story_id}/entities/{entity_id}
#[instrument(skip(state))]
async fn get_entity(
    State(state): State<AppState>,
    Path((session_id, story_id, entity_id)): Path<(Uuid, String, String)>,
) -> Result<Json<EntityView>, ApiError> {
    let view =
        query_handlers::get_entity(&state.engine, session_id, &story_id, &entity_id).await?;
    Ok(Json(view))
}

/// GET /{session_id}/stories/{story_id}/clues
///
/// Empty until the traversal mints a clue, and again once it is evicted.
#[instrument(skip(state))]
async fn list_clues(
    State(state): State<AppState>,
    Path((session_id, story_id)): Path<(Uuid, String)>,
) -> Json<TraversalCluesResponse> {
    let clues = state.clues.clues_for(session_id, &story_id);
    Json(TraversalCluesResponse {
        session_id,
        story_id,
        clues,
    })
}

/// Returns the router for traversals.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(open_session))
        .route("/{session_id}/advance", post(advance))
        .route("/{session_id}/stories/{story_id}", get(get_traversal))
        .route("/{session_id}/stories/{story_id}/clues", get(list_clues))
        .route(
            "/{session_id}/stories/{story_id}/entities/{entity_id}",
            get(get_entity),
        )
}
