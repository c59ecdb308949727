//! Error types for scene loading.
//!
//! Rendering itself never fails; bad geometry degrades to a fallback and is
//! logged instead.

use thiserror::Error;

/// Result type for cellscene operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Scene file extension we do not know how to read
    #[error("Unsupported scene format: .{0} (use .toml, .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("Unknown built-in theme '{name}'. Available: {available}")]
    UnknownTheme { name: String, available: String },

    /// Semantically invalid scene (parses, but cannot be mounted)
    #[error("Invalid scene: {0}")]
    InvalidScene(String),
}
