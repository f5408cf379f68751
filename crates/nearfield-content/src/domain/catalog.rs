//! Scene catalog: authored content keyed by story, scene and action key.

use std::collections::{BTreeMap, HashSet};

use nearfield_core::action::{ActionKey, NextActionType};
use nearfield_core::model::{
    AdvanceResult, EntityDelta, InteractionPolicy, NarrativeUnit, SceneStatus, UnitType,
};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Root of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCatalog {
    /// Stories in the catalog.
    pub stories: Vec<StoryContent>,
}

/// One authored story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryContent {
    /// Story identifier.
    pub story_id: String,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Scenes of the story.
    pub scenes: Vec<SceneContent>,
}

/// One authored scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneContent {
    /// Scene identifier.
    pub scene_id: String,
    /// Batches keyed by action key.
    pub actions: BTreeMap<ActionKey, SceneBatch>,
}

/// The authored part of an advance result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneBatch {
    /// Events in playback order.
    #[serde(default)]
    pub new_events: Vec<NarrativeUnit>,
    /// Entity deltas in application order.
    #[serde(default)]
    pub entity_updates: Vec<EntityDelta>,
    /// Declared termination flags.
    #[serde(default)]
    pub scene_status: SceneStatus,
    /// Declared next action.
    pub next_action_type: NextActionType,
}

impl SceneBatch {
    /// Builds the advance result for the given story and scene.
    #[must_use]
    pub fn to_result(&self, story_id: &str, scene_id: &str) -> AdvanceResult {
        AdvanceResult {
            story_id: story_id.to_owned(),
            current_scene_id: scene_id.to_owned(),
            new_events: self.new_events.clone(),
            entity_updates: self.entity_updates.clone(),
            scene_status: self.scene_status.clone(),
            next_action_type: self.next_action_type,
        }
    }

    fn ends_scene(&self) -> bool {
        self.scene_status.ends_scene(self.next_action_type)
    }

    fn declared_policy(&self) -> Option<&InteractionPolicy> {
        self.scene_status.declared_policy(&self.new_events)
    }
}

/// Checks the content rules of a parsed catalog.
///
/// # Errors
///
/// Returns `CatalogError::Invalid` listing every problem found.
pub fn validate_catalog(catalog: &SceneCatalog) -> Result<(), CatalogError> {
    let mut problems = Vec::new();
    let mut story_ids = HashSet::new();

    for story in &catalog.stories {
        if !story_ids.insert(story.story_id.as_str()) {
            problems.push(format!("duplicate story {}", story.story_id));
        }
        let mut scene_ids = HashSet::new();
        for scene in &story.scenes {
            let at = format!("{}/{}", story.story_id, scene.scene_id);
            if !scene_ids.insert(scene.scene_id.as_str()) {
                problems.push(format!("{at}: duplicate scene"));
            }
            validate_scene(&at, scene, &mut problems);
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::Invalid(problems.join("; ")))
    }
}

fn validate_scene(at: &str, scene: &SceneContent, problems: &mut Vec<String>) {
    for (key, batch) in &scene.actions {
        let mut unit_ids = HashSet::new();
        for unit in &batch.new_events {
            if unit.unit_id.is_empty() {
                problems.push(format!("{at}/{key}: unit without unit_id"));
            } else if !unit_ids.insert(unit.unit_id.as_str()) {
                problems.push(format!("{at}/{key}: duplicate unit_id {}", unit.unit_id));
            }
            if unit.unit_type != UnitType::InterventionPoint
                && (unit.hint.is_some() || unit.policy.is_some())
            {
                problems.push(format!(
                    "{at}/{key}: unit {} carries a hint or policy but is not an intervention point",
                    unit.unit_id
                ));
            }
        }
        if let Some(policy) = batch.declared_policy() {
            match key {
                _ if policy.max_turns == 0 => {
                    problems.push(format!("{at}/{key}: max_turns must be positive"));
                }
                ActionKey::InteractTurn(turn) if *turn > policy.max_turns => {
                    problems.push(format!(
                        "{at}/{key}: policy of {} turns declared after its budget is spent",
                        policy.max_turns
                    ));
                }
                _ => {}
            }
        }
    }

    let budget = scene
        .actions
        .values()
        .find_map(SceneBatch::declared_policy)
        .map(|p| p.max_turns);
    if let Some(max_turns) = budget {
        if let Some(last) = scene.actions.get(&ActionKey::InteractTurn(max_turns)) {
            if !last.ends_scene() {
                problems.push(format!(
                    "{at}/INTERACT_turn_{max_turns}: last turn of the budget must end the scene"
                ));
            }
        }
    }
}
