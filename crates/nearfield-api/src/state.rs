//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use nearfield_content::application::static_provider::{StaticSceneProvider, StorySummary};
use nearfield_core::clock::Clock;
use nearfield_core::provider::SceneDataProvider;
use nearfield_narrative::application::clue_journal::ClueJournal;
use nearfield_narrative::application::engine::AdvanceEngine;
use serde::Serialize;

/// Description of the content being served.
#[derive(Debug, Clone, Serialize)]
pub struct ContentInfo {
    /// Provider name.
    pub provider: &'static str,
    /// Catalog fingerprint, if the provider has one.
    pub fingerprint: Option<String>,
    /// Stories available to traverse.
    pub stories: Vec<StorySummary>,
}

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The advance engine and its traversals.
    pub engine: Arc<AdvanceEngine>,
    /// Clues handed off by the engine.
    pub clues: Arc<ClueJournal>,
    /// Content served by the engine's provider.
    pub content: Arc<ContentInfo>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(engine: Arc<AdvanceEngine>, clues: Arc<ClueJournal>, content: ContentInfo) -> Self {
        Self {
            engine,
            clues,
            content: Arc::new(content),
        }
    }

    /// Wires an engine over a static catalog with a fresh clue journal.
    #[must_use]
    pub fn with_static_provider(
        provider: StaticSceneProvider,
        clock: Arc<dyn Clock>,
        provider_timeout: Duration,
        idle_timeout: Duration,
    ) -> Self {
        let content = ContentInfo {
            provider: provider.name(),
            fingerprint: Some(provider.fingerprint().to_owned()),
            stories: provider.stories().to_vec(),
        };
        let clues = Arc::new(ClueJournal::new());
        let engine = AdvanceEngine::new(
            Arc::new(provider),
            clues.clone(),
            clock,
            provider_timeout,
        )
        .with_idle_timeout(idle_timeout);
        Self::new(Arc::new(engine), clues, content)
    }
}
