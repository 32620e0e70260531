//! Filesystem descriptor source.
//!
//! Maps a module key to `<root>/<path>/<manifest_file>` for local modules
//! and `<external_root>/<path>/<manifest_file>` for external ones, then
//! parses and validates the manifest found there.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hdlplan_common::config::HdlplanConfig;
use hdlplan_common::constants::MANIFEST_FILE_NAME;
use hdlplan_common::error::{HdlplanError, Result};
use hdlplan_common::types::{Scope, ScopedPath};

use crate::descriptor::Descriptor;
use crate::parser::{ast::ManifestFile, parse_manifest};
use crate::resolver::DescriptorSource;

/// Loads module manifests from a directory tree.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    root: PathBuf,
    external_root: Option<PathBuf>,
    manifest_file: String,
}

impl ManifestLoader {
    /// Creates a loader for the project rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            external_root: None,
            manifest_file: MANIFEST_FILE_NAME.into(),
        }
    }

    /// Creates a loader using the manifest name and external root of `config`.
    #[must_use]
    pub fn from_config(root: impl Into<PathBuf>, config: &HdlplanConfig) -> Self {
        Self {
            root: root.into(),
            external_root: config.external_root.clone(),
            manifest_file: config.manifest_file.clone(),
        }
    }

    /// Sets the directory external module references resolve against.
    #[must_use]
    pub fn with_external_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.external_root = Some(dir.into());
        self
    }

    /// Project root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory of the module at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error for external keys when no external root is set.
    pub fn locate(&self, key: &ScopedPath) -> Result<PathBuf> {
        let base = match key.scope() {
            Scope::Local => &self.root,
            Scope::External => self.external_root.as_ref().ok_or_else(|| HdlplanError::Config {
                message: format!("module {key} is external but no external root is configured"),
            })?,
        };
        Ok(base.join(key.as_str()))
    }

    /// Returns the manifest file path of the module at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error for external keys when no external root is set.
    pub fn manifest_path(&self, key: &ScopedPath) -> Result<PathBuf> {
        Ok(self.locate(key)?.join(&self.manifest_file))
    }

    /// Reads and parses the complete manifest of the module at `key`,
    /// including its `BUILD` block.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read, parsed, or validated.
    pub fn read(&self, key: &ScopedPath) -> Result<ManifestFile> {
        let path = self.manifest_path(key)?;
        tracing::info!(path = %path.display(), "loading manifest");

        let content = std::fs::read_to_string(&path).map_err(|e| HdlplanError::Io {
            path: path.clone(),
            source: e,
        })?;
        parse_manifest(&content).map_err(|e| e.with_origin(&path))
    }
}

impl DescriptorSource for ManifestLoader {
    fn load(&self, key: &ScopedPath) -> Result<Arc<Descriptor>> {
        Ok(Arc::new(self.read(key)?.descriptor))
    }
}
