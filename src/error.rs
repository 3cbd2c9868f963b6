//! Error types for the pose accuracy library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML document could not be parsed or written
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON document could not be parsed or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pose identifier unknown to the criteria catalog
    #[error("No criteria configured for pose: {0}")]
    ConfigNotFound(String),

    /// No stored reference landmarks for the pose
    #[error("No reference pose stored for: {0}")]
    ReferenceNotFound(String),

    /// Authored catalog data failed validation
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
