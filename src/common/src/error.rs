use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading or resolving sync configuration.
///
/// All of them are fatal for a sync job: they are reported before any
/// partition path is processed.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// A key without default was neither supplied nor inferable.
    #[error("Required configuration '{key}' is not set and has no default")]
    MissingRequired { key: String },

    /// The key is not registered in the configuration catalog.
    #[error("Unknown configuration key '{key}'")]
    UnknownKey { key: String },

    /// The catalog registers the same key twice.
    #[error("Configuration key '{key}' is registered more than once")]
    DuplicateKey { key: String },

    /// A value could not be interpreted as the type its key expects.
    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The configured extractor identifier names no known strategy.
    #[error("Unknown partition value extractor '{value}' configured for '{key}'")]
    UnknownExtractor { key: String, value: String },

    /// Inference for `key` depends on itself.
    #[error("Inference cycle while resolving '{key}': {}", .chain.join(" -> "))]
    InferenceCycle { key: String, chain: Vec<String> },

    /// An inference rule resolved a catalog key it did not declare in its
    /// reads.
    #[error("Inference for '{key}' resolves undeclared key '{read}'")]
    UndeclaredRead { key: String, read: String },

    /// An explicitly requested configuration file is missing.
    #[error("Configuration file '{}' does not exist", .path.display())]
    FileNotFound { path: PathBuf },

    /// Merging configuration sources failed.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Arc<figment::Error>),
}

impl ConfigError {
    pub(crate) fn invalid_value(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
