//! Near-field interaction API server entry point.

use std::sync::Arc;

use nearfield_api::config::ApiConfig;
use nearfield_api::error::AppError;
use nearfield_api::routes;
use nearfield_api::state::AppState;
use nearfield_content::application::static_provider::StaticSceneProvider;
use nearfield_core::clock::SystemClock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = ApiConfig::from_env()?;

    tracing::info!(
        content_path = ?config.content_path,
        provider_timeout_ms = config.provider_timeout.as_millis(),
        traversal_idle_timeout_secs = config.traversal_idle_timeout.as_secs(),
        "Starting near-field interaction API server"
    );

    let provider = match &config.content_path {
        Some(path) => StaticSceneProvider::from_path(path)?,
        None => StaticSceneProvider::demo()?,
    };

    let app_state = AppState::with_static_provider(
        provider,
        Arc::new(SystemClock),
        config.provider_timeout,
        config.traversal_idle_timeout,
    );

    // TODO: Replace CorsLayer::permissive() with the renderer's origin once it is deployed.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
