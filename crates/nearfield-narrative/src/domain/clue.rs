//! Clue emission rules.

use std::collections::BTreeSet;

use nearfield_core::model::{Clue, ClueStatus};
use tracing::{debug, warn};

/// Decides which provider-declared clues are actually minted for a
/// traversal.
///
/// A clue is minted only by a step that ends its scene, at most once per
/// `clue_id`, and always leaves the engine tagged `untracked` and attached
/// to the traversal's story.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClueMint {
    minted: BTreeSet<String>,
}

impl ClueMint {
    /// Creates a mint that has issued nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits or drops a candidate clue, returning the clue to emit.
    pub fn admit(
        &mut self,
        story_id: &str,
        candidate: Option<Clue>,
        is_scene_over: bool,
    ) -> Option<Clue> {
        let mut clue = candidate?;
        if !is_scene_over {
            warn!(clue_id = %clue.clue_id, "dropping clue declared on a non-terminal batch");
            return None;
        }
        if !self.minted.insert(clue.clue_id.clone()) {
            debug!(clue_id = %clue.clue_id, "clue already minted for this traversal");
            return None;
        }
        clue.status = ClueStatus::Untracked;
        story_id.clone_into(&mut clue.story_id);
        Some(clue)
    }

    /// Identifiers minted so far, in sorted order.
    pub fn minted_ids(&self) -> impl Iterator<Item = &str> {
        self.minted.iter().map(String::as_str)
    }
}
