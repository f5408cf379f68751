//! In-memory clue tracking collaborator.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use nearfield_core::model::Clue;
use nearfield_core::provider::ClueSink;
use tracing::debug;
use uuid::Uuid;

use crate::domain::traversal::TraversalKey;

/// Keeps every clue handed off by the engine, grouped per traversal in
/// hand-off order.
#[derive(Debug, Default)]
pub struct ClueJournal {
    by_traversal: Mutex<HashMap<TraversalKey, Vec<Clue>>>,
}

impl ClueJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clues recorded for one session's traversal of a story.
    pub fn clues_for(&self, session_id: Uuid, story_id: &str) -> Vec<Clue> {
        self.by_traversal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TraversalKey::new(session_id, story_id))
            .cloned()
            .unwrap_or_default()
    }
}

impl ClueSink for ClueJournal {
    fn hand_off(&self, session_id: Uuid, clue: Clue) {
        debug!(%session_id, clue_id = %clue.clue_id, story_id = %clue.story_id, "journaling clue");
        self.by_traversal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(TraversalKey::new(session_id, clue.story_id.clone()))
            .or_default()
            .push(clue);
    }

    fn release(&self, session_id: Uuid, story_id: &str) {
        self.by_traversal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&TraversalKey::new(session_id, story_id));
    }
}
