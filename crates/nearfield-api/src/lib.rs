//! HTTP surface of the near-field interaction engine.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
