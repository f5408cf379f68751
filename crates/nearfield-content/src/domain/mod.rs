//! Catalog model and validation.

pub mod catalog;
