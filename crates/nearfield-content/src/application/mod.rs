//! Provider implementations over a loaded catalog.

pub mod static_provider;
