//! Nearfield Narrative: the near-field interaction advance engine.
//!
//! Responsible for turn-by-turn scene progression, forced convergence once
//! an interaction budget is spent, entity-state merging, and clue emission.

pub mod application;
pub mod domain;
