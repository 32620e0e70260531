//! Unified error types for the hdlplan workspace.
//!
//! These cover infrastructure failures (I/O, manifest syntax, configuration).
//! Resolution failures are reported separately as typed diagnostics by the
//! manifest engine.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum HdlplanError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A manifest could not be tokenized, parsed, or validated.
    #[error("invalid manifest{}: {message}", origin_suffix(.origin))]
    Manifest {
        /// File the manifest was read from, when known.
        origin: Option<PathBuf>,
        /// Description of the problem.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

fn origin_suffix(origin: &Option<PathBuf>) -> String {
    origin
        .as_ref()
        .map_or_else(String::new, |p| format!(" {}", p.display()))
}

impl HdlplanError {
    /// Creates a manifest error without a known origin file.
    #[must_use]
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            origin: None,
            message: message.into(),
        }
    }

    /// Attaches the originating file to a manifest error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_origin(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Manifest {
                origin: None,
                message,
            } => Self::Manifest {
                origin: Some(path.into()),
                message,
            },
            other => other,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, HdlplanError>;
