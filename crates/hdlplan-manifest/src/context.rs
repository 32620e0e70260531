//! Resolution context: the environment a build plan is evaluated against.
//!
//! A [`RawContext`] carries the unchecked fields as supplied by the caller
//! (command line, `BUILD` block, embedding tool). [`Context::validate`]
//! turns it into an immutable [`Context`] or a [`Diagnostic`].

use hdlplan_common::types::Action;
use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// Unvalidated context fields.
///
/// Also used as the context snapshot attached to every [`Diagnostic`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawContext {
    /// Target platform family, e.g. `xilinx`.
    pub platform: String,
    /// Device identifier, e.g. `xc6vlx240t`.
    pub device: String,
    /// Build action, `synthesis` or `simulation`.
    pub action: String,
    /// Simulator backend, required for simulation.
    pub sim_backend: Option<String>,
    /// Variant selectors in request order.
    pub variants: Vec<String>,
}

impl RawContext {
    /// Creates raw fields for a synthesis run.
    #[must_use]
    pub fn synthesis(platform: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            device: device.into(),
            action: Action::Synthesis.as_str().into(),
            ..Self::default()
        }
    }

    /// Creates raw fields for a simulation run.
    #[must_use]
    pub fn simulation(
        platform: impl Into<String>,
        device: impl Into<String>,
        backend: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            device: device.into(),
            action: Action::Simulation.as_str().into(),
            sim_backend: Some(backend.into()),
            variants: Vec::new(),
        }
    }

    /// Appends a variant selector.
    #[must_use]
    pub fn with_variant(mut self, name: impl Into<String>) -> Self {
        self.variants.push(name.into());
        self
    }

    /// Fills every empty field of `self` from `defaults`.
    ///
    /// Variants are taken from `defaults` only when `self` requests none.
    #[must_use]
    pub fn or(mut self, defaults: &Self) -> Self {
        if self.platform.is_empty() {
            self.platform.clone_from(&defaults.platform);
        }
        if self.device.is_empty() {
            self.device.clone_from(&defaults.device);
        }
        if self.action.is_empty() {
            self.action.clone_from(&defaults.action);
        }
        if self.sim_backend.is_none() {
            self.sim_backend.clone_from(&defaults.sim_backend);
        }
        if self.variants.is_empty() {
            self.variants.clone_from(&defaults.variants);
        }
        self
    }
}

/// Validated, immutable resolution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    platform: String,
    device: String,
    action: Action,
    sim_backend: Option<String>,
    variants: Vec<String>,
}

impl Context {
    /// Validates raw context fields.
    ///
    /// Device strings are not interpreted here; each descriptor decides
    /// which prefix or identifier it cares about.
    ///
    /// # Errors
    ///
    /// Returns a [`Diagnostic`] of kind `InvalidAction`, `MissingSimBackend`
    /// or `MissingField` when the fields do not form a usable context.
    pub fn validate(raw: &RawContext) -> Result<Self, Diagnostic> {
        let fail = |kind| Diagnostic::new(kind, raw.clone());

        let action = raw.action.parse::<Action>().map_err(|_| {
            fail(DiagnosticKind::InvalidAction {
                value: raw.action.clone(),
            })
        })?;

        let platform = raw.platform.trim();
        if platform.is_empty() {
            return Err(fail(DiagnosticKind::MissingField { field: "platform" }));
        }
        let device = raw.device.trim();
        if device.is_empty() {
            return Err(fail(DiagnosticKind::MissingField { field: "device" }));
        }

        let sim_backend = raw
            .sim_backend
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from);
        if action == Action::Simulation && sim_backend.is_none() {
            return Err(fail(DiagnosticKind::MissingSimBackend));
        }

        let mut variants: Vec<String> = Vec::with_capacity(raw.variants.len());
        for name in &raw.variants {
            let name = name.trim();
            if !name.is_empty() && !variants.iter().any(|v| v == name) {
                variants.push(name.to_owned());
            }
        }

        Ok(Self {
            platform: platform.to_owned(),
            device: device.to_owned(),
            action,
            sim_backend,
            variants,
        })
    }

    /// Target platform family.
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Device identifier.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Build action.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Simulator backend, always present for simulation runs.
    #[must_use]
    pub fn sim_backend(&self) -> Option<&str> {
        self.sim_backend.as_deref()
    }

    /// Variant selectors, deduplicated, in request order.
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Returns the fields as a [`RawContext`] snapshot.
    #[must_use]
    pub fn snapshot(&self) -> RawContext {
        RawContext {
            platform: self.platform.clone(),
            device: self.device.clone(),
            action: self.action.as_str().into(),
            sim_backend: self.sim_backend.clone(),
            variants: self.variants.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_synthesis_context() {
        let ctx = Context::validate(&RawContext::synthesis("xilinx", "xc6vlx240t"))
            .expect("should validate");
        assert_eq!(ctx.platform(), "xilinx");
        assert_eq!(ctx.device(), "xc6vlx240t");
        assert_eq!(ctx.action(), Action::Synthesis);
        assert!(ctx.sim_backend().is_none());
    }

    #[test]
    fn validate_rejects_unknown_action() {
        let raw = RawContext {
            action: "place".into(),
            ..RawContext::synthesis("xilinx", "xc7a200t")
        };
        let diag = Context::validate(&raw).unwrap_err();
        assert_eq!(
            diag.kind,
            DiagnosticKind::InvalidAction {
                value: "place".into()
            }
        );
        assert_eq!(diag.context, raw);
    }

    #[test]
    fn validate_requires_backend_for_simulation() {
        let raw = RawContext::simulation("xilinx", "xc7a200t", "  ");
        let diag = Context::validate(&raw).unwrap_err();
        assert_eq!(diag.kind, DiagnosticKind::MissingSimBackend);
    }

    #[test]
    fn validate_requires_device() {
        let diag = Context::validate(&RawContext::synthesis("xilinx", "")).unwrap_err();
        assert_eq!(diag.kind, DiagnosticKind::MissingField { field: "device" });
    }

    #[test]
    fn validate_requires_platform() {
        let diag = Context::validate(&RawContext::synthesis("", "xc7a200t")).unwrap_err();
        assert_eq!(diag.kind, DiagnosticKind::MissingField { field: "platform" });
    }

    #[test]
    fn validate_deduplicates_variants_in_order() {
        let raw = RawContext::synthesis("xilinx", "xc6slx45t")
            .with_variant("sniffer_s6_wrapper")
            .with_variant("bpm_wrapper")
            .with_variant("sniffer_s6_wrapper");
        let ctx = Context::validate(&raw).expect("should validate");
        assert_eq!(ctx.variants(), ["sniffer_s6_wrapper", "bpm_wrapper"]);
    }

    #[test]
    fn synthesis_keeps_unused_backend() {
        let raw = RawContext {
            sim_backend: Some("modelsim".into()),
            ..RawContext::synthesis("xilinx", "xc7a200t")
        };
        let ctx = Context::validate(&raw).expect("should validate");
        assert_eq!(ctx.sim_backend(), Some("modelsim"));
    }

    #[test]
    fn or_fills_only_empty_fields() {
        let defaults = RawContext::simulation("xilinx", "xc7a200t", "modelsim").with_variant("bpm_wrapper");
        let merged = RawContext {
            device: "xc6vlx240t".into(),
            ..RawContext::default()
        }
        .or(&defaults);
        assert_eq!(merged.platform, "xilinx");
        assert_eq!(merged.device, "xc6vlx240t");
        assert_eq!(merged.action, "simulation");
        assert_eq!(merged.sim_backend.as_deref(), Some("modelsim"));
        assert_eq!(merged.variants, ["bpm_wrapper"]);
    }

    #[test]
    fn snapshot_reflects_normalized_fields() {
        let raw = RawContext::simulation(" xilinx ", "xc7a200t", "ghdl");
        let ctx = Context::validate(&raw).expect("should validate");
        let snap = ctx.snapshot();
        assert_eq!(snap.platform, "xilinx");
        assert_eq!(snap.action, "simulation");
        assert_eq!(snap.sim_backend.as_deref(), Some("ghdl"));
    }
}
