//! Nearfield Content: canned scene content.
//!
//! Serves authored scenes from a YAML catalog through the
//! `SceneDataProvider` interface, and ships the built-in demo story.

pub mod application;
pub mod domain;
pub mod error;
