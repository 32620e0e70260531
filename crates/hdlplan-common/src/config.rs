//! Global configuration model for hdlplan resolution runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HdlplanError, Result};

/// Order in which a module's own files and its children's files are emitted.
///
/// Some toolchains need packages compiled before the units that use them,
/// so the order is part of the build contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// A module's files are appended before its referenced modules are walked.
    #[default]
    FilesFirst,
    /// Referenced modules are walked first, then the module's own files.
    ChildrenFirst,
}

/// How an unmatched simulation backend is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendPolicy {
    /// Backends without a dedicated rule use the files collected so far.
    #[default]
    Fallback,
    /// A backend table that does not list the requested backend is an error.
    Strict,
}

/// Root configuration for hdlplan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdlplanConfig {
    /// File/children emission order.
    pub traversal: TraversalOrder,
    /// Treatment of backends with no matching rule.
    pub backend_policy: BackendPolicy,
    /// Manifest file name looked up in each module directory.
    pub manifest_file: String,
    /// Directory externally rooted module references resolve against.
    pub external_root: Option<PathBuf>,
}

impl Default for HdlplanConfig {
    fn default() -> Self {
        Self {
            traversal: TraversalOrder::default(),
            backend_policy: BackendPolicy::default(),
            manifest_file: crate::constants::MANIFEST_FILE_NAME.into(),
            external_root: None,
        }
    }
}

impl HdlplanConfig {
    /// Reads a JSON configuration file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HdlplanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        if config.manifest_file.trim().is_empty() {
            return Err(HdlplanError::Config {
                message: "manifest_file must not be empty".into(),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_behavior() {
        let config = HdlplanConfig::default();
        assert_eq!(config.traversal, TraversalOrder::FilesFirst);
        assert_eq!(config.backend_policy, BackendPolicy::Fallback);
        assert_eq!(config.manifest_file, "Manifest.hdm");
        assert!(config.external_root.is_none());
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hdlplan.json");
        std::fs::write(
            &path,
            r#"{ "traversal": "children-first", "external_root": "/opt/ip" }"#,
        )
        .expect("write");

        let config = HdlplanConfig::load(&path).expect("should load");
        assert_eq!(config.traversal, TraversalOrder::ChildrenFirst);
        assert_eq!(config.backend_policy, BackendPolicy::Fallback);
        assert_eq!(config.external_root, Some(PathBuf::from("/opt/ip")));
    }

    #[test]
    fn load_rejects_empty_manifest_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hdlplan.json");
        std::fs::write(&path, r#"{ "manifest_file": " " }"#).expect("write");

        let err = HdlplanConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("manifest_file"), "got: {err}");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = HdlplanConfig::load(Path::new("/nonexistent/hdlplan.json")).unwrap_err();
        assert!(matches!(err, HdlplanError::Io { .. }));
    }
}
