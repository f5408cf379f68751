//! Entity State Ledger.

use std::collections::HashMap;

use nearfield_core::model::{EntityAttributes, EntityDelta};
use tracing::debug;

/// Latest known attributes per entity for one scene traversal.
///
/// Deltas overwrite: attributes named in a delta replace the stored
/// values, attributes not named are left alone, and an entity is created
/// the first time a delta references it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityLedger {
    entities: HashMap<String, EntityAttributes>,
}

impl EntityLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts the attributes of `delta` onto its entity.
    pub fn apply(&mut self, delta: &EntityDelta) {
        let entry = self.entities.entry(delta.entity_id.clone()).or_default();
        for (name, value) in &delta.attributes {
            entry.insert(name.clone(), value.clone());
        }
        debug!(entity_id = %delta.entity_id, attributes = delta.attributes.len(), "merged entity delta");
    }

    /// Applies deltas in sequence order; later writes to the same
    /// attribute win.
    pub fn apply_all<'a>(&mut self, deltas: impl IntoIterator<Item = &'a EntityDelta>) {
        for delta in deltas {
            self.apply(delta);
        }
    }

    /// Returns the current attributes of an entity, if it is known.
    #[must_use]
    pub fn snapshot(&self, entity_id: &str) -> Option<&EntityAttributes> {
        self.entities.get(entity_id)
    }

    /// Iterates over all known entities.
    pub fn entities(&self) -> impl Iterator<Item = (&String, &EntityAttributes)> {
        self.entities.iter()
    }

    /// Number of known entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity has been referenced yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
