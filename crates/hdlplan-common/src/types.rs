//! Domain primitive types used across the hdlplan workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::EXTERNAL_SCOPE_PREFIX;
use crate::error::HdlplanError;

/// Build action a resolution is performed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Produce a netlist for a device.
    Synthesis,
    /// Compile for a simulator backend.
    Simulation,
}

impl Action {
    /// Returns the canonical lowercase name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Synthesis => "synthesis",
            Self::Simulation => "simulation",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = HdlplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("synthesis") {
            Ok(Self::Synthesis)
        } else if trimmed.eq_ignore_ascii_case("simulation") {
            Ok(Self::Simulation)
        } else {
            Err(HdlplanError::Config {
                message: format!("unknown action \"{trimmed}\" (expected synthesis or simulation)"),
            })
        }
    }
}

/// Root a module or file path is relative to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Inside the project tree being resolved.
    #[default]
    Local,
    /// Inside the external module root.
    External,
}

/// A lexically normalized, `/`-separated path tagged with its [`Scope`].
///
/// Module keys and build plan file entries are both `ScopedPath`s, so two
/// spellings of the same location (`a/../b/x.vhd` and `b/x.vhd`) compare
/// equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopedPath {
    scope: Scope,
    path: String,
}

impl ScopedPath {
    /// Creates a normalized path in the given scope.
    #[must_use]
    pub fn new(scope: Scope, path: &str) -> Self {
        Self {
            scope,
            path: normalize(path),
        }
    }

    /// Creates a normalized path in the local scope.
    #[must_use]
    pub fn local(path: &str) -> Self {
        Self::new(Scope::Local, path)
    }

    /// Creates a normalized path in the external scope.
    #[must_use]
    pub fn external(path: &str) -> Self {
        Self::new(Scope::External, path)
    }

    /// Joins a relative path onto this one, keeping the scope.
    #[must_use]
    pub fn join(&self, relative: &str) -> Self {
        if self.path.is_empty() {
            return Self::new(self.scope, relative);
        }
        Self::new(self.scope, &format!("{}/{relative}", self.path))
    }

    /// Returns the scope.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// Returns the normalized path. The scope root itself is the empty string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ScopedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "." } else { &self.path };
        match self.scope {
            Scope::Local => f.write_str(path),
            Scope::External => write!(f, "{EXTERNAL_SCOPE_PREFIX}{path}"),
        }
    }
}

/// Lexically normalizes a path: drops `.` and empty segments, resolves `..`
/// against preceding segments, and treats `\` as a separator. Leading `..`
/// segments that cannot be resolved are kept.
#[must_use]
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    let _ = segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}
