//! Error types for the layered configuration engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the registry and the load/update/save pipeline.
///
/// File-read, file-parse, and environment-coercion failures are recovered
/// (with a warning) rather than surfaced, so they have no variant here.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config type '{0}' is already registered")]
    AlreadyRegistered(&'static str),

    #[error("Config type '{0}' is not registered")]
    NotRegistered(&'static str),

    #[error("Config type '{0}' has not been loaded")]
    NotLoaded(&'static str),

    #[error("Schema error for config type '{name}': {reason}")]
    Schema { name: &'static str, reason: String },

    #[error("Invalid configuration for '{name}': {reason}")]
    Validation { name: &'static str, reason: String },

    #[error("Failed to encode config type '{name}': {source}")]
    Encode {
        name: &'static str,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
