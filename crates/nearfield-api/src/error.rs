//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nearfield_content::error::CatalogError;
use nearfield_core::error::AdvanceError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message returned in place of internal details on 5xx responses.
pub const GENERIC_FAILURE_MESSAGE: &str = "something went wrong, try again";

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The scene catalog could not be loaded.
    #[error("content error: {0}")]
    Content(#[from] CatalogError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `AdvanceError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub AdvanceError);

impl From<AdvanceError> for ApiError {
    fn from(err: AdvanceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            AdvanceError::SceneNotFound { .. } => (StatusCode::NOT_FOUND, "scene_not_found"),
            AdvanceError::ActionKeyNotFound { .. } => {
                (StatusCode::NOT_FOUND, "action_key_not_found")
            }
            AdvanceError::TraversalNotFound(_) => (StatusCode::NOT_FOUND, "traversal_not_found"),
            AdvanceError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            AdvanceError::StoryOver(_) => (StatusCode::CONFLICT, "story_over"),
            AdvanceError::PolicyExhausted { .. } => (StatusCode::CONFLICT, "policy_exhausted"),
            AdvanceError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AdvanceError::ProviderTimeout { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, "provider_timeout")
            }
            AdvanceError::Provider(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let message = if status.is_server_error() {
            error!(error = %self.0, code = error_code, "advance failed upstream");
            GENERIC_FAILURE_MESSAGE.to_owned()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}
