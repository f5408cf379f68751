//! Shared test doubles for the near-field interaction engine.

mod clock;
mod clues;
mod provider;

pub use clock::{FixedClock, ManualClock};
pub use clues::RecordingClueSink;
pub use provider::{
    EmptySceneProvider, FailingSceneProvider, ScriptedSceneProvider, StalledSceneProvider,
};
