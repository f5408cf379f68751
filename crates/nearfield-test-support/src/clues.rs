//! Test clue sink.

use std::sync::Mutex;

use nearfield_core::model::Clue;
use nearfield_core::provider::ClueSink;
use uuid::Uuid;

/// A clue sink that keeps every clue handed to it, with its session, and
/// every traversal released.
#[derive(Debug, Default)]
pub struct RecordingClueSink {
    handed_off: Mutex<Vec<(Uuid, Clue)>>,
    released: Mutex<Vec<(Uuid, String)>>,
}

impl RecordingClueSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all clues handed off so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clues(&self) -> Vec<Clue> {
        self.handed_off
            .lock()
            .unwrap()
            .iter()
            .map(|(_, clue)| clue.clone())
            .collect()
    }

    /// Returns the session of every hand-off, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sessions(&self) -> Vec<Uuid> {
        self.handed_off
            .lock()
            .unwrap()
            .iter()
            .map(|(session_id, _)| *session_id)
            .collect()
    }

    /// Returns every released `(session_id, story_id)`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn released(&self) -> Vec<(Uuid, String)> {
        self.released.lock().unwrap().clone()
    }
}

impl ClueSink for RecordingClueSink {
    fn hand_off(&self, session_id: Uuid, clue: Clue) {
        self.handed_off.lock().unwrap().push((session_id, clue));
    }

    fn release(&self, session_id: Uuid, story_id: &str) {
        self.released
            .lock()
            .unwrap()
            .push((session_id, story_id.to_owned()));
    }
}
