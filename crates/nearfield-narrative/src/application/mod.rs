//! Application services driving traversals.

pub mod clue_journal;
pub mod engine;
pub mod query_handlers;
