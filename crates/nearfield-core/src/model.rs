//! Protocol data model: narrative units, entity deltas, policies, clues and
//! the advance result returned for every step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::NextActionType;

/// Kind of a narrative unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    /// Plain narration or dialogue.
    Narrative,
    /// One exchange of a bounded dialogue.
    InteractionTurn,
    /// A point where the player may choose to intervene or pass.
    InterventionPoint,
}

/// An atomic narrative event. Order within a batch is playback order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeUnit {
    /// Unique within one scene traversal.
    pub unit_id: String,
    /// The unit kind.
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    /// Speaker identity, or `"System"`.
    pub actor: String,
    /// Unit text. Empty for a player turn the front end fills in.
    #[serde(default)]
    pub content: String,
    /// Optional hint shown with an intervention point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Interaction policy introduced by an intervention point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<InteractionPolicy>,
}

/// Attribute set of an entity, keyed by attribute name.
pub type EntityAttributes = BTreeMap<String, serde_json::Value>;

/// Overwrite of some attributes of one entity.
///
/// Serialized flat: `{ "entity_id": "npc_1", "composure": 40 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDelta {
    /// The entity the delta applies to.
    pub entity_id: String,
    /// Attributes to overwrite.
    #[serde(flatten)]
    pub attributes: EntityAttributes,
}

/// Turn budget of an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionPolicy {
    /// Turn budget, fixed per scene entry.
    pub max_turns: u32,
    /// Accepted turns so far.
    #[serde(default)]
    pub current_turn: u32,
    /// What the player is trying to achieve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    /// Limits the player operates under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
}

/// Lifecycle of a clue once handed to the tracking collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueStatus {
    /// Freshly minted, not yet known to the player.
    #[default]
    Untracked,
    /// Tracked by the player.
    Tracked,
    /// Resolved or used up.
    Resolved,
}

/// A discoverable narrative artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    /// Globally unique, stable identifier.
    pub clue_id: String,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub summary: String,
    /// Tracking status.
    #[serde(default)]
    pub status: ClueStatus,
    /// The story the clue belongs to.
    #[serde(default)]
    pub story_id: String,
}

/// Scene and story termination flags of a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneStatus {
    /// The scene is terminal.
    pub is_scene_over: bool,
    /// Scene handed off to, if any.
    pub next_scene_id: Option<String>,
    /// The whole traversal is terminal.
    pub is_story_over: bool,
    /// At most one clue minted by this step.
    pub new_clue: Option<Clue>,
    /// Present only while an interaction budget is active.
    pub interaction_policy: Option<InteractionPolicy>,
}

/// Full output of one protocol step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceResult {
    /// Story of the traversal.
    pub story_id: String,
    /// Scene the events belong to.
    pub current_scene_id: String,
    /// Events in playback order.
    pub new_events: Vec<NarrativeUnit>,
    /// Entity deltas in application order.
    pub entity_updates: Vec<EntityDelta>,
    /// Termination flags.
    pub scene_status: SceneStatus,
    /// What the caller should do next.
    pub next_action_type: NextActionType,
}

impl SceneStatus {
    /// True when these flags, read together with `next_action_type`, end
    /// the scene.
    #[must_use]
    pub fn ends_scene(&self, next_action_type: NextActionType) -> bool {
        self.is_scene_over || self.is_story_over || next_action_type == NextActionType::SceneEnded
    }

    /// Returns the first interaction policy a batch declares: this
    /// status's policy if present, otherwise the first intervention point
    /// in `events` carrying one.
    #[must_use]
    pub fn declared_policy<'a>(
        &'a self,
        events: &'a [NarrativeUnit],
    ) -> Option<&'a InteractionPolicy> {
        self.interaction_policy.as_ref().or_else(|| {
            events
                .iter()
                .filter(|unit| unit.unit_type == UnitType::InterventionPoint)
                .find_map(|unit| unit.policy.as_ref())
        })
    }
}

impl AdvanceResult {
    /// See [`SceneStatus::declared_policy`].
    #[must_use]
    pub fn declared_policy(&self) -> Option<&InteractionPolicy> {
        self.scene_status.declared_policy(&self.new_events)
    }

    /// See [`SceneStatus::ends_scene`].
    #[must_use]
    pub fn ends_scene(&self) -> bool {
        self.scene_status.ends_scene(self.next_action_type)
    }
}
