//! Static lookup-table provider over a scene catalog.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use async_trait::async_trait;
use nearfield_core::action::ActionKey;
use nearfield_core::error::AdvanceError;
use nearfield_core::model::AdvanceResult;
use nearfield_core::provider::SceneDataProvider;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::domain::catalog::{SceneBatch, SceneCatalog, validate_catalog};
use crate::error::CatalogError;

const DEMO_STORY: &str = include_str!("../../content/demo-story.yaml");

/// Summary of one story served by a provider.
#[derive(Debug, Clone, Serialize)]
pub struct StorySummary {
    /// Story identifier.
    pub story_id: String,
    /// Display title.
    pub title: Option<String>,
    /// Scene identifiers in authored order.
    pub scene_ids: Vec<String>,
}

/// Serves canned batches from a validated catalog.
#[derive(Debug)]
pub struct StaticSceneProvider {
    batches: HashMap<(String, String, ActionKey), SceneBatch>,
    stories: Vec<StorySummary>,
    fingerprint: String,
}

impl StaticSceneProvider {
    /// Parses and validates a YAML catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed YAML and
    /// `CatalogError::Invalid` when content rules are broken.
    pub fn from_yaml_str(source: &str) -> Result<Self, CatalogError> {
        let catalog: SceneCatalog = serde_yaml::from_str(source)?;
        validate_catalog(&catalog)?;

        let fingerprint = Sha256::digest(source.as_bytes()).iter().fold(
            String::with_capacity(64),
            |mut hex, byte| {
                let _ = write!(hex, "{byte:02x}");
                hex
            },
        );

        let mut batches = HashMap::new();
        let mut stories = Vec::with_capacity(catalog.stories.len());
        for story in catalog.stories {
            let mut scene_ids = Vec::with_capacity(story.scenes.len());
            for scene in story.scenes {
                for (key, batch) in scene.actions {
                    batches.insert(
                        (story.story_id.clone(), scene.scene_id.clone(), key),
                        batch,
                    );
                }
                scene_ids.push(scene.scene_id);
            }
            stories.push(StorySummary {
                story_id: story.story_id,
                title: story.title,
                scene_ids,
            });
        }

        info!(
            stories = stories.len(),
            batches = batches.len(),
            %fingerprint,
            "loaded scene catalog"
        );

        Ok(Self {
            batches,
            stories,
            fingerprint,
        })
    }

    /// Reads a YAML catalog from disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, plus the
    /// errors of [`Self::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// The built-in demo story.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded catalog is broken.
    pub fn demo() -> Result<Self, CatalogError> {
        Self::from_yaml_str(DEMO_STORY)
    }

    /// SHA-256 hex digest of the catalog source.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Stories in the catalog, in authored order.
    #[must_use]
    pub fn stories(&self) -> &[StorySummary] {
        &self.stories
    }
}

#[async_trait]
impl SceneDataProvider for StaticSceneProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn resolve(
        &self,
        story_id: &str,
        scene_id: &str,
        action_key: &ActionKey,
    ) -> Result<Option<AdvanceResult>, AdvanceError> {
        let found = self
            .batches
            .get(&(story_id.to_owned(), scene_id.to_owned(), *action_key))
            .map(|batch| batch.to_result(story_id, scene_id));
        debug!(story_id, scene_id, %action_key, found = found.is_some(), "static lookup");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearfield_core::action::NextActionType;

    #[tokio::test]
    async fn test_demo_load_scene_resolves_opening_units() {
        // Arrange
        let provider = StaticSceneProvider::demo().unwrap();

        // Act
        let result = provider
            .resolve("demo-story", "scene-a", &ActionKey::LoadScene)
            .await
            .unwrap()
            .unwrap();

        // Assert
        assert_eq!(result.story_id, "demo-story");
        assert_eq!(result.current_scene_id, "scene-a");
        let ids: Vec<_> = result.new_events.iter().map(|u| u.unit_id.as_str()).collect();
        assert_eq!(ids, vec!["U001", "U002"]);
        assert_eq!(result.next_action_type, NextActionType::PlayingNarrative);
    }

    #[tokio::test]
    async fn test_turn_beyond_authored_content_is_absent_but_default_exists() {
        let provider = StaticSceneProvider::demo().unwrap();

        let beyond = provider
            .resolve("demo-story", "scene-b", &ActionKey::InteractTurn(6))
            .await
            .unwrap();
        let fallback = provider
            .resolve("demo-story", "scene-b", &ActionKey::InteractDefault)
            .await
            .unwrap()
            .unwrap();

        assert!(beyond.is_none());
        assert!(fallback.scene_status.is_scene_over);
        assert!(fallback.scene_status.is_story_over);
    }

    #[tokio::test]
    async fn test_unknown_triple_resolves_to_none() {
        let provider = StaticSceneProvider::demo().unwrap();

        let unknown_scene = provider
            .resolve("demo-story", "scene-z", &ActionKey::LoadScene)
            .await
            .unwrap();
        let no_default = provider
            .resolve("demo-story", "scene-a", &ActionKey::InteractDefault)
            .await
            .unwrap();

        assert!(unknown_scene.is_none());
        assert!(no_default.is_none());
    }

    #[test]
    fn test_demo_summary_and_fingerprint() {
        let provider = StaticSceneProvider::demo().unwrap();
        let again = StaticSceneProvider::demo().unwrap();

        assert_eq!(provider.stories().len(), 1);
        assert_eq!(provider.stories()[0].scene_ids, vec!["scene-a", "scene-b"]);
        assert_eq!(provider.fingerprint().len(), 64);
        assert_eq!(provider.fingerprint(), again.fingerprint());
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let result = StaticSceneProvider::from_yaml_str("stories: [ { story_id: ");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = StaticSceneProvider::from_path("/nonexistent/catalog.yaml");
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
