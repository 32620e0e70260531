//! Evaluation of one descriptor against one context.
//!
//! Each axis (device, action, backend) is a first-match table. An empty
//! table means the module does not vary along that axis. A non-empty device
//! or action table without a match is a hard failure; a backend table
//! without a match falls back to the files collected so far unless the
//! strict policy is selected.

use hdlplan_common::config::BackendPolicy;
use hdlplan_common::types::Action;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::descriptor::{ActionRule, Clause, Descriptor, ModuleRef};
use crate::diagnostic::DiagnosticKind;

/// Files and module references one descriptor yields for one context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Files relative to the module directory, in contribution order.
    pub files: Vec<String>,
    /// Referenced modules, in contribution order.
    pub modules: Vec<ModuleRef>,
}

impl Selection {
    fn extend(&mut self, clause: &Clause) {
        self.files.extend(clause.files.iter().cloned());
        self.modules.extend(clause.modules.iter().cloned());
    }
}

/// Evaluates `descriptor` against `context`.
///
/// Contribution order: base clause, matched device rule, its matched action
/// rule and backend rule, the matched module-level action rule and backend
/// rule, then variant files in selector order.
///
/// # Errors
///
/// Returns `UnsupportedTargetDevice`, `UnsupportedAction`, `UnknownVariant`,
/// or (strict policy only) `UnsupportedBackend`.
pub fn evaluate(
    descriptor: &Descriptor,
    context: &Context,
    policy: BackendPolicy,
) -> Result<Selection, DiagnosticKind> {
    let mut selection = Selection::default();
    selection.extend(&descriptor.base);

    if !descriptor.devices.is_empty() {
        let rule = descriptor
            .devices
            .iter()
            .find(|r| r.matches(context.platform(), context.device()))
            .ok_or_else(|| DiagnosticKind::UnsupportedTargetDevice {
                platform: context.platform().to_owned(),
                device: context.device().to_owned(),
            })?;
        tracing::trace!(module = %descriptor.name, class = %rule.class, "device rule selected");
        selection.extend(&rule.clause);
        apply_actions(&mut selection, &rule.actions, context, policy)?;
    }

    apply_actions(&mut selection, &descriptor.actions, context, policy)?;
    apply_variants(&mut selection, descriptor, context)?;
    Ok(selection)
}

fn apply_actions(
    selection: &mut Selection,
    rules: &[ActionRule],
    context: &Context,
    policy: BackendPolicy,
) -> Result<(), DiagnosticKind> {
    if rules.is_empty() {
        return Ok(());
    }
    let rule = rules
        .iter()
        .find(|r| r.action == context.action())
        .ok_or(DiagnosticKind::UnsupportedAction {
            action: context.action(),
        })?;
    selection.extend(&rule.clause);

    if context.action() != Action::Simulation || rule.backends.is_empty() {
        return Ok(());
    }
    let Some(backend) = context.sim_backend() else {
        return Ok(());
    };
    match rule
        .backends
        .iter()
        .find(|b| b.backend.eq_ignore_ascii_case(backend))
    {
        Some(matched) => selection.extend(&matched.clause),
        None if policy == BackendPolicy::Strict => {
            return Err(DiagnosticKind::UnsupportedBackend {
                backend: backend.to_owned(),
            });
        }
        None => tracing::debug!(backend, "no backend rule, using source files only"),
    }
    Ok(())
}

fn apply_variants(
    selection: &mut Selection,
    descriptor: &Descriptor,
    context: &Context,
) -> Result<(), DiagnosticKind> {
    if descriptor.variants.is_none() {
        return Ok(());
    }
    for name in context.variants() {
        let variant = descriptor
            .find_variant(name)
            .ok_or_else(|| DiagnosticKind::UnknownVariant { name: name.clone() })?;
        selection.files.push(variant.file.clone());
    }
    Ok(())
}
