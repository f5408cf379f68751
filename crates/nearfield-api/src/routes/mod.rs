//! Route modules, one per resource.

use axum::Router;

use crate::state::AppState;

pub mod content;
pub mod health;
pub mod traversal;

/// Returns the full application router, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/content", content::router())
        .nest("/api/v1/traversals", traversal::router())
}
