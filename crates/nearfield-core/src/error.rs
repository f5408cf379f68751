//! Protocol error types.

use thiserror::Error;

use crate::action::{ActionKey, ActionType, TraversalState};

/// Error returned by a single `advance` step.
///
/// Every variant is local to the step that produced it: the traversal it
/// was issued against is left exactly as it was before the call.
#[derive(Debug, Error)]
pub enum AdvanceError {
    /// The provider has no entry for the story/scene pair.
    #[error("scene not found: {story_id}/{scene_id}")]
    SceneNotFound {
        /// The requested story.
        story_id: String,
        /// The requested scene.
        scene_id: String,
    },

    /// The provider has no content for the requested action or turn.
    #[error("no content for action key {action_key} in scene {scene_id}")]
    ActionKeyNotFound {
        /// The scene that was queried.
        scene_id: String,
        /// The key that could not be resolved.
        action_key: ActionKey,
    },

    /// An interaction arrived after the turn budget was spent and no
    /// terminal fallback exists.
    #[error("interaction budget of {max_turns} turns exhausted in scene {scene_id}")]
    PolicyExhausted {
        /// The scene whose budget ran out.
        scene_id: String,
        /// The exhausted budget.
        max_turns: u32,
    },

    /// The provider did not answer in time.
    #[error("provider timed out after {timeout_ms}ms resolving {action_key}")]
    ProviderTimeout {
        /// The key being resolved.
        action_key: ActionKey,
        /// The configured timeout.
        timeout_ms: u64,
    },

    /// The action is not accepted in the traversal's current state.
    #[error("action {action} is not accepted in state {state}")]
    InvalidTransition {
        /// The current state.
        state: TraversalState,
        /// The rejected action.
        action: ActionType,
    },

    /// The traversal has reached the end of its story.
    #[error("story {0} is over")]
    StoryOver(String),

    /// No traversal exists for the given key.
    #[error("traversal not found: {0}")]
    TraversalNotFound(String),

    /// A request or provider batch failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The provider failed for a reason of its own.
    #[error("provider error: {0}")]
    Provider(String),
}
