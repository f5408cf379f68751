//! Test providers: mock `SceneDataProvider` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use nearfield_core::action::ActionKey;
use nearfield_core::error::AdvanceError;
use nearfield_core::model::AdvanceResult;
use nearfield_core::provider::SceneDataProvider;

/// A provider serving batches registered up front, keyed by
/// (story, scene, action key). Records every key it is asked for.
#[derive(Debug, Default)]
pub struct ScriptedSceneProvider {
    batches: HashMap<(String, String, ActionKey), AdvanceResult>,
    resolved: Mutex<Vec<String>>,
}

impl ScriptedSceneProvider {
    /// Create an empty scripted provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the batch returned for a triple.
    #[must_use]
    pub fn with(
        mut self,
        story_id: &str,
        scene_id: &str,
        action_key: ActionKey,
        batch: AdvanceResult,
    ) -> Self {
        self.batches.insert(
            (story_id.to_owned(), scene_id.to_owned(), action_key),
            batch,
        );
        self
    }

    /// Returns the keys resolved so far, formatted as
    /// `story/scene/ACTION_KEY`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn resolved_keys(&self) -> Vec<String> {
        self.resolved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SceneDataProvider for ScriptedSceneProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn resolve(
        &self,
        story_id: &str,
        scene_id: &str,
        action_key: &ActionKey,
    ) -> Result<Option<AdvanceResult>, AdvanceError> {
        self.resolved
            .lock()
            .unwrap()
            .push(format!("{story_id}/{scene_id}/{action_key}"));
        Ok(self
            .batches
            .get(&(story_id.to_owned(), scene_id.to_owned(), *action_key))
            .cloned())
    }
}

/// A provider with no content at all.
#[derive(Debug)]
pub struct EmptySceneProvider;

#[async_trait]
impl SceneDataProvider for EmptySceneProvider {
    fn name(&self) -> &'static str {
        "empty"
    }

    async fn resolve(
        &self,
        _story_id: &str,
        _scene_id: &str,
        _action_key: &ActionKey,
    ) -> Result<Option<AdvanceResult>, AdvanceError> {
        Ok(None)
    }
}

/// A provider whose backend always fails. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingSceneProvider;

#[async_trait]
impl SceneDataProvider for FailingSceneProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn resolve(
        &self,
        _story_id: &str,
        _scene_id: &str,
        _action_key: &ActionKey,
    ) -> Result<Option<AdvanceResult>, AdvanceError> {
        Err(AdvanceError::Provider("connection refused".into()))
    }
}

/// A provider that never answers. Useful for exercising timeouts.
#[derive(Debug)]
pub struct StalledSceneProvider;

#[async_trait]
impl SceneDataProvider for StalledSceneProvider {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn resolve(
        &self,
        _story_id: &str,
        _scene_id: &str,
        _action_key: &ActionKey,
    ) -> Result<Option<AdvanceResult>, AdvanceError> {
        std::future::pending().await
    }
}
