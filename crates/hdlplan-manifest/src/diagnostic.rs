//! Typed resolution failures.
//!
//! Every failure the engine can report is a [`Diagnostic`]: a
//! [`DiagnosticKind`] plus the module it is attributed to, the reference
//! path from the root, and a snapshot of the context. Rendering to text and
//! choosing an exit code is left to the caller.

use hdlplan_common::types::Action;
use serde::Serialize;
use thiserror::Error;

use crate::context::RawContext;

/// Classification of a resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The requested action is not `synthesis` or `simulation`.
    #[error("invalid action \"{value}\" (expected synthesis or simulation)")]
    InvalidAction {
        /// Value as supplied.
        value: String,
    },

    /// A simulation run was requested without a simulator backend.
    #[error("action simulation requires a simulation backend")]
    MissingSimBackend,

    /// A required context field is empty.
    #[error("required context field `{field}` is empty")]
    MissingField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// No device rule of the module matches the platform and device.
    #[error("target/device not supported: {platform}/{device}")]
    UnsupportedTargetDevice {
        /// Requested platform.
        platform: String,
        /// Requested device.
        device: String,
    },

    /// The module varies by action but declares no rule for this one.
    #[error("action not supported: {action}")]
    UnsupportedAction {
        /// Requested action.
        action: Action,
    },

    /// Strict backend policy only: the backend table has no matching entry.
    #[error("simulation backend not supported: {backend}")]
    UnsupportedBackend {
        /// Requested backend.
        backend: String,
    },

    /// A variant selector is not declared by the module's variant table.
    #[error("unknown variant \"{name}\"")]
    UnknownVariant {
        /// Requested selector.
        name: String,
    },

    /// A module references itself, directly or transitively.
    #[error("cyclic module reference: {}", .path.join(" -> "))]
    CyclicModuleReference {
        /// Module keys from the root to the repeated module, inclusive.
        path: Vec<String>,
    },

    /// The module's descriptor could not be loaded.
    #[error("manifest unavailable: {reason}")]
    ManifestUnavailable {
        /// Loader error message.
        reason: String,
    },
}

/// A resolution failure attributed to a module and a context.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Declared name of the module the failure is attributed to.
    pub module: Option<String>,
    /// Module keys from the root to the failing module, inclusive.
    pub path: Vec<String>,
    /// Context the resolution ran against.
    pub context: RawContext,
    /// Rendered one-line description.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic not yet attributed to any module.
    #[must_use]
    pub fn new(kind: DiagnosticKind, context: RawContext) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            module: None,
            path: Vec::new(),
            context,
            message,
        }
    }

    /// Attributes the diagnostic to a module reached through `path`.
    #[must_use]
    pub fn in_module(mut self, module: Option<String>, path: Vec<String>) -> Self {
        self.module = module;
        self.path = path;
        self.message = render(&self.kind, self.module.as_deref(), &self.path);
        self
    }
}

fn render(kind: &DiagnosticKind, module: Option<&str>, path: &[String]) -> String {
    let mut out = match module {
        Some(name) => format!("{name}: {kind}"),
        None => kind.to_string(),
    };
    // Cycle messages already spell out the path.
    if path.len() > 1 && !matches!(kind, DiagnosticKind::CyclicModuleReference { .. }) {
        out.push_str(&format!(" (via {})", path.join(" -> ")));
    }
    out
}
