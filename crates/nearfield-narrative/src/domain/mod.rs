//! Domain model of a scene traversal.

pub mod clue;
pub mod commands;
pub mod ledger;
pub mod policy;
pub mod traversal;
