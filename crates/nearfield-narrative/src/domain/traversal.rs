//! The traversal aggregate: one player's progression through a story.
//!
//! A traversal owns the state machine position, the turn counter, the
//! entity ledger and the policy tracker of its current scene. The engine
//! drives it in two phases: [`Traversal::begin`] validates an incoming
//! command and names the [`Step`] to resolve, and [`Traversal::accept`]
//! folds the resolved batch in. `accept` is meant to run on a clone so a
//! rejected batch never leaves partial state behind.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use nearfield_core::action::{ActionKey, ActionType, NextActionType, TraversalState};
use nearfield_core::error::AdvanceError;
use nearfield_core::model::{AdvanceResult, InteractionPolicy, NarrativeUnit, SceneStatus};
use tracing::warn;
use uuid::Uuid;

use super::clue::ClueMint;
use super::commands::Advance;
use super::ledger::EntityLedger;
use super::policy::PolicyTracker;

/// Arena key of a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraversalKey {
    /// The player session.
    pub session_id: Uuid,
    /// The story being traversed.
    pub story_id: String,
}

impl TraversalKey {
    /// Creates a key.
    #[must_use]
    pub fn new(session_id: Uuid, story_id: impl Into<String>) -> Self {
        Self {
            session_id,
            story_id: story_id.into(),
        }
    }
}

impl fmt::Display for TraversalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session_id, self.story_id)
    }
}

/// A validated unit of work, ready to be resolved against a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Enter a scene fresh.
    Load {
        /// The scene to enter.
        scene_id: String,
    },
    /// Count and resolve the given turn.
    Interact {
        /// The turn number after increment.
        turn: u32,
    },
    /// Decline the intervention.
    Pass,
}

impl Step {
    /// The key resolved first for this step.
    #[must_use]
    pub fn action_key(&self) -> ActionKey {
        match self {
            Self::Load { .. } => ActionKey::LoadScene,
            Self::Interact { turn } => ActionKey::InteractTurn(*turn),
            Self::Pass => ActionKey::Pass,
        }
    }

    /// The key resolved when [`Self::action_key`] has no content.
    #[must_use]
    pub fn fallback_key(&self) -> Option<ActionKey> {
        match self {
            Self::Interact { .. } => Some(ActionKey::InteractDefault),
            _ => None,
        }
    }
}

/// One player's progression through a story's scenes.
#[derive(Debug, Clone)]
pub struct Traversal {
    pub(crate) key: TraversalKey,
    pub(crate) state: TraversalState,
    pub(crate) scene_id: Option<String>,
    pub(crate) turn: u32,
    pub(crate) ledger: EntityLedger,
    pub(crate) policy: PolicyTracker,
    pub(crate) clues: ClueMint,
    pub(crate) last_status: Option<SceneStatus>,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) last_advanced_at: Option<DateTime<Utc>>,
    seen_units: HashSet<String>,
}

impl Traversal {
    /// Creates an uninitialized traversal.
    #[must_use]
    pub fn new(key: TraversalKey, started_at: DateTime<Utc>) -> Self {
        Self {
            key,
            state: TraversalState::Uninitialized,
            scene_id: None,
            turn: 0,
            ledger: EntityLedger::new(),
            policy: PolicyTracker::new(),
            clues: ClueMint::new(),
            last_status: None,
            started_at,
            last_advanced_at: None,
            seen_units: HashSet::new(),
        }
    }

    /// The traversal key.
    #[must_use]
    pub fn key(&self) -> &TraversalKey {
        &self.key
    }

    /// Current state machine position.
    #[must_use]
    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// The scene currently entered, if any.
    #[must_use]
    pub fn scene_id(&self) -> Option<&str> {
        self.scene_id.as_deref()
    }

    /// Accepted turns in the current scene.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The entity ledger of the current scene.
    #[must_use]
    pub fn ledger(&self) -> &EntityLedger {
        &self.ledger
    }

    /// The active interaction policy, if any.
    #[must_use]
    pub fn policy(&self) -> Option<&InteractionPolicy> {
        self.policy.policy()
    }

    /// True once a step has ended the story.
    #[must_use]
    pub fn is_story_over(&self) -> bool {
        self.last_status.as_ref().is_some_and(|s| s.is_story_over)
    }

    /// Validates `command` against the state machine and names the step
    /// to resolve.
    ///
    /// # Errors
    ///
    /// Returns `AdvanceError::StoryOver` once the story has ended,
    /// `AdvanceError::InvalidTransition` for an action the current state
    /// does not accept, and `AdvanceError::Validation` for a mismatched
    /// scene or a turn input on a non-`INTERACT` action.
    pub fn begin(&self, command: &Advance) -> Result<Step, AdvanceError> {
        if command.turn_input.is_some() && command.action != ActionType::Interact {
            return Err(AdvanceError::Validation(format!(
                "turn input is only accepted with INTERACT, not {}",
                command.action
            )));
        }
        if self.is_story_over() {
            return Err(AdvanceError::StoryOver(self.key.story_id.clone()));
        }

        match (self.state, command.action) {
            (TraversalState::Uninitialized, ActionType::LoadScene) => Ok(Step::Load {
                scene_id: command.scene_id.clone(),
            }),
            (TraversalState::SceneEnded, ActionType::LoadScene) => self.hand_off(&command.scene_id),
            (
                TraversalState::PlayingNarrative
                | TraversalState::AwaitingInteraction
                | TraversalState::AwaitingIntervention,
                ActionType::Interact,
            ) => {
                self.ensure_current_scene(&command.scene_id)?;
                Ok(Step::Interact {
                    turn: self.turn + 1,
                })
            }
            (TraversalState::AwaitingIntervention, ActionType::Pass) => {
                self.ensure_current_scene(&command.scene_id)?;
                Ok(Step::Pass)
            }
            (state, action) => Err(AdvanceError::InvalidTransition { state, action }),
        }
    }

    /// True when `batch` would spend the last turn of the budget without
    /// ending the scene.
    #[must_use]
    pub fn breaks_forced_convergence(&self, step: &Step, batch: &AdvanceResult) -> bool {
        let Step::Interact { turn } = step else {
            return false;
        };
        if batch.ends_scene() {
            return false;
        }
        let mut budget = self.policy.clone();
        if !budget.is_active() {
            let Some(declared) = batch.declared_policy() else {
                return false;
            };
            if budget.start(declared.max_turns, None, None, turn - 1).is_err() {
                return false;
            }
        }
        match budget.advance("") {
            Ok(_) => budget.is_converged(),
            Err(_) => true,
        }
    }

    /// Folds a resolved batch into the traversal and returns the result
    /// to hand to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AdvanceError::Validation` for malformed batches and
    /// `AdvanceError::PolicyExhausted` when the budget is spent and the
    /// batch does not end the scene. The traversal may be partially
    /// updated on error, so callers run this on a staged copy.
    pub fn accept(
        &mut self,
        step: &Step,
        mut batch: AdvanceResult,
        now: DateTime<Utc>,
    ) -> Result<AdvanceResult, AdvanceError> {
        if let Step::Load { scene_id } = step {
            self.enter_scene(scene_id);
        }
        let scene_id = self
            .scene_id
            .clone()
            .ok_or_else(|| AdvanceError::Validation("no scene has been loaded".to_owned()))?;

        self.record_units(&batch.new_events)?;

        match step {
            Step::Load { .. } => {
                if let Some(declared) = batch.declared_policy().cloned() {
                    self.introduce_policy(&scene_id, &declared, self.turn)?;
                }
            }
            Step::Interact { turn } => {
                if let Some(declared) = batch.declared_policy().cloned() {
                    self.introduce_policy(&scene_id, &declared, turn - 1)?;
                }
                self.turn = *turn;
                if self.policy.is_active() {
                    self.policy.advance(&scene_id)?;
                }
            }
            Step::Pass => {}
        }

        let mut status = std::mem::take(&mut batch.scene_status);
        if matches!(step, Step::Pass)
            || status.is_story_over
            || batch.next_action_type == NextActionType::SceneEnded
        {
            status.is_scene_over = true;
        }
        if self.policy.is_converged() && !status.is_scene_over {
            let max_turns = self.policy.policy().map_or(0, |p| p.max_turns);
            return Err(AdvanceError::PolicyExhausted {
                scene_id,
                max_turns,
            });
        }
        let next_action_type = if status.is_scene_over {
            NextActionType::SceneEnded
        } else {
            batch.next_action_type
        };

        status.interaction_policy = match step {
            Step::Pass => None,
            _ => self.policy.policy().cloned(),
        };
        status.new_clue =
            self.clues
                .admit(&self.key.story_id, status.new_clue.take(), status.is_scene_over);

        self.ledger.apply_all(&batch.entity_updates);
        if status.is_scene_over {
            self.policy.clear();
        }
        self.state = next_action_type.into();
        self.last_status = Some(status.clone());
        self.last_advanced_at = Some(now);

        batch.story_id.clone_from(&self.key.story_id);
        batch.current_scene_id = scene_id;
        batch.scene_status = status;
        batch.next_action_type = next_action_type;
        Ok(batch)
    }

    /// Clue identifiers minted during this traversal.
    pub fn minted_clue_ids(&self) -> impl Iterator<Item = &str> {
        self.clues.minted_ids()
    }

    fn enter_scene(&mut self, scene_id: &str) {
        self.scene_id = Some(scene_id.to_owned());
        self.turn = 0;
        self.ledger = EntityLedger::new();
        self.policy.clear();
        self.seen_units.clear();
        self.last_status = None;
    }

    fn hand_off(&self, scene_id: &str) -> Result<Step, AdvanceError> {
        let current = self.scene_id.as_deref().unwrap_or_default();
        match self
            .last_status
            .as_ref()
            .and_then(|s| s.next_scene_id.as_deref())
        {
            Some(next) if next == scene_id => Ok(Step::Load {
                scene_id: scene_id.to_owned(),
            }),
            Some(next) => Err(AdvanceError::Validation(format!(
                "scene {current} hands off to {next}, not {scene_id}"
            ))),
            None => Err(AdvanceError::Validation(format!(
                "scene {current} does not hand off to another scene"
            ))),
        }
    }

    fn ensure_current_scene(&self, scene_id: &str) -> Result<(), AdvanceError> {
        match self.scene_id.as_deref() {
            Some(current) if current == scene_id => Ok(()),
            current => Err(AdvanceError::Validation(format!(
                "traversal is in scene {}, not {scene_id}",
                current.unwrap_or("<none>")
            ))),
        }
    }

    /// Starts the declared policy with its count aligned to the scene's
    /// turn counter, `elapsed` being the turns taken before this batch.
    fn introduce_policy(
        &mut self,
        scene_id: &str,
        declared: &InteractionPolicy,
        elapsed: u32,
    ) -> Result<(), AdvanceError> {
        match self.policy.policy() {
            None => self.policy.start(
                declared.max_turns,
                declared.goal.clone(),
                declared.constraints.clone(),
                elapsed,
            ),
            Some(active) if active.max_turns != declared.max_turns => {
                warn!(
                    scene_id,
                    active = active.max_turns,
                    declared = declared.max_turns,
                    "ignoring change of max_turns within a scene"
                );
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }

    fn record_units(&mut self, units: &[NarrativeUnit]) -> Result<(), AdvanceError> {
        for unit in units {
            if unit.unit_id.is_empty() {
                return Err(AdvanceError::Validation(
                    "narrative unit without unit_id".to_owned(),
                ));
            }
            if !self.seen_units.insert(unit.unit_id.clone()) {
                return Err(AdvanceError::Validation(format!(
                    "duplicate unit_id {} in scene traversal",
                    unit.unit_id
                )));
            }
        }
        Ok(())
    }
}
