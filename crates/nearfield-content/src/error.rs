//! Content loading errors.

use thiserror::Error;

/// Error raised while loading or validating a scene catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog is not valid YAML or does not match the schema.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog parsed but breaks a content rule.
    #[error("invalid catalog: {0}")]
    Invalid(String),
}
