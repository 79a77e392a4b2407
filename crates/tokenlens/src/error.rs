//! Error types for the extraction pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading inputs and configuration.
///
/// Extraction itself never fails: bad colors, shadows and rules are skipped
/// and counted in [`tokenlens_core::ExtractionStats`].
#[derive(Debug, Error)]
pub enum TokenlensError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A scan document is not valid JSON for [`crate::ScanInput`].
    #[error("invalid scan document: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file is not valid YAML.
    #[error("invalid configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {field}: {message}")]
    InvalidConfig { field: String, message: String },

    /// A stylesheet could not be scanned.
    #[error(transparent)]
    Scan(#[from] tokenlens_css::ScanError),
}

impl TokenlensError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, TokenlensError>;
