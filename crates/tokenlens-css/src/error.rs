//! Error types for stylesheet scanning.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while scanning stylesheets.
///
/// Lenient scanning never fails on CSS content; it counts skipped rules
/// instead. These errors come from reading files and from strict scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The stylesheet file could not be read.
    #[error("failed to read stylesheet {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rule could not be parsed (strict scanning only).
    #[error("invalid rule at line {line}, column {column}: {snippet}")]
    InvalidRule {
        line: u32,
        column: u32,
        snippet: String,
    },
}

/// Result type for scanner operations.
pub type Result<T> = std::result::Result<T, ScanError>;
