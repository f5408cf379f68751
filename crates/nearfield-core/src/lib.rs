//! Nearfield Core: shared protocol types and abstractions.
//!
//! This crate defines the data model of the near-field interaction advance
//! protocol and the traits the engine is written against. It contains no
//! infrastructure code.

pub mod action;
pub mod clock;
pub mod command;
pub mod error;
pub mod model;
pub mod provider;
