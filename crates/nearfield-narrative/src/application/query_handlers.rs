//! Query handlers for the Near-Field Interaction context.
//!
//! This module contains query handlers that read traversal state and return
//! read-only view DTOs. Queries never mutate a traversal.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nearfield_core::action::TraversalState;
use nearfield_core::error::AdvanceError;
use nearfield_core::model::{EntityAttributes, InteractionPolicy};
use serde::Serialize;
use uuid::Uuid;

use crate::application::engine::AdvanceEngine;
use crate::domain::traversal::TraversalKey;

/// Read-only view of a traversal.
#[derive(Debug, Serialize)]
pub struct TraversalView {
    /// The player session.
    pub session_id: Uuid,
    /// The story being traversed.
    pub story_id: String,
    /// The scene currently entered, if any.
    pub current_scene_id: Option<String>,
    /// State machine position.
    pub state: TraversalState,
    /// Accepted turns in the current scene.
    pub turn: u32,
    /// Active interaction policy, if any.
    pub interaction_policy: Option<InteractionPolicy>,
    /// Ledger contents of the current scene.
    pub entities: BTreeMap<String, EntityAttributes>,
    /// Clues minted during this traversal.
    pub minted_clue_ids: Vec<String>,
    /// When the traversal was created.
    pub started_at: DateTime<Utc>,
    /// When the last step committed.
    pub last_advanced_at: Option<DateTime<Utc>>,
}

/// Current attributes of one entity.
#[derive(Debug, Serialize)]
pub struct EntityView {
    /// The entity identifier.
    pub entity_id: String,
    /// Latest known attributes.
    pub attributes: EntityAttributes,
}

/// Retrieves a traversal by session and story.
///
/// # Errors
///
/// Returns `AdvanceError::TraversalNotFound` if no traversal exists.
pub async fn get_traversal(
    engine: &AdvanceEngine,
    session_id: Uuid,
    story_id: &str,
) -> Result<TraversalView, AdvanceError> {
    let key = TraversalKey::new(session_id, story_id);
    let slot = engine
        .existing_slot(&key)
        .ok_or_else(|| AdvanceError::TraversalNotFound(key.to_string()))?;
    let traversal = slot.lock().await;
    Ok(TraversalView {
        session_id,
        story_id: story_id.to_owned(),
        current_scene_id: traversal.scene_id().map(str::to_owned),
        state: traversal.state(),
        turn: traversal.turn(),
        interaction_policy: traversal.policy().cloned(),
        entities: traversal
            .ledger()
            .entities()
            .map(|(id, attributes)| (id.clone(), attributes.clone()))
            .collect(),
        minted_clue_ids: traversal.minted_clue_ids().map(str::to_owned).collect(),
        started_at: traversal.started_at,
        last_advanced_at: traversal.last_advanced_at,
    })
}

/// Retrieves the ledger snapshot of one entity in a traversal's current
/// scene.
///
/// # Errors
///
/// Returns `AdvanceError::TraversalNotFound` if no traversal exists, or
/// `AdvanceError::Validation` if the entity has never been referenced.
pub async fn get_entity(
    engine: &AdvanceEngine,
    session_id: Uuid,
    story_id: &str,
    entity_id: &str,
) -> Result<EntityView, AdvanceError> {
    let key = TraversalKey::new(session_id, story_id);
    let slot = engine
        .existing_slot(&key)
        .ok_or_else(|| AdvanceError::TraversalNotFound(key.to_string()))?;
    let traversal = slot.lock().await;
    let attributes = traversal
        .ledger()
        .snapshot(entity_id)
        .cloned()
        .ok_or_else(|| AdvanceError::Validation(format!("unknown entity {entity_id}")))?;
    Ok(EntityView {
        entity_id: entity_id.to_owned(),
        attributes,
    })
}
