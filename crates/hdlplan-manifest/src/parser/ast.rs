//! Parsed form of an `.hdm` manifest file.

use serde::{Deserialize, Serialize};

use crate::context::RawContext;
use crate::descriptor::Descriptor;

/// Root node of a parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestFile {
    /// Optional `BUILD` block.
    pub build: Option<BuildSettings>,
    /// The `MODULE` block.
    pub descriptor: Descriptor,
}

/// A `BUILD` block: context defaults and tool metadata of a root manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Default build action.
    pub action: Option<String>,
    /// Default simulator backend.
    pub sim_backend: Option<String>,
    /// Default platform family.
    pub platform: Option<String>,
    /// Default device identifier.
    pub device: Option<String>,
    /// Default variant selectors.
    pub variants: Vec<String>,
    /// Top-level unit for synthesis.
    pub top_module: Option<String>,
    /// Top-level unit for simulation.
    pub sim_top: Option<String>,
    /// Command the tool layer runs after simulation compilation.
    pub post_cmd: Option<String>,
}

impl BuildSettings {
    /// Returns the context fields the block provides; unset fields are empty.
    #[must_use]
    pub fn context_defaults(&self) -> RawContext {
        RawContext {
            platform: self.platform.clone().unwrap_or_default(),
            device: self.device.clone().unwrap_or_default(),
            action: self.action.clone().unwrap_or_default(),
            sim_backend: self.sim_backend.clone(),
            variants: self.variants.clone(),
        }
    }
}
