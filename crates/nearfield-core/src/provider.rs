//! Collaborator abstractions at the edges of the advance engine.

use async_trait::async_trait;
use uuid::Uuid;

use crate::action::ActionKey;
use crate::error::AdvanceError;
use crate::model::{AdvanceResult, Clue};

/// Source of narrative content for the advance engine.
///
/// Implementations are the sole authority for event content and for the
/// scene status and next action type they declare. The engine never
/// synthesizes narrative text.
#[async_trait]
pub trait SceneDataProvider: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Resolve the batch for a (story, scene, action key) triple.
    ///
    /// Returns `Ok(None)` when the provider has no content for the triple.
    ///
    /// # Errors
    ///
    /// Returns `AdvanceError::Provider` when the backend itself fails.
    async fn resolve(
        &self,
        story_id: &str,
        scene_id: &str,
        action_key: &ActionKey,
    ) -> Result<Option<AdvanceResult>, AdvanceError>;
}

/// Receives clues minted by the engine. Ownership of the clue passes to
/// the sink; the engine never touches it again.
pub trait ClueSink: Send + Sync {
    /// Take ownership of a clue minted in `session_id`'s traversal of
    /// `clue.story_id`.
    fn hand_off(&self, session_id: Uuid, clue: Clue);

    /// Called when the engine evicts `session_id`'s traversal of
    /// `story_id`. Sinks holding per-traversal state may drop it.
    fn release(&self, _session_id: Uuid, _story_id: &str) {}
}
