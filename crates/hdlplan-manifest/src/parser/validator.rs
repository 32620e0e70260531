//! Static analysis of module descriptors.
//!
//! Checks that at most one device rule of a module can match any context
//! and that every path is non-empty and relative, before any context is
//! applied. Runs on parsed manifests and can be run on descriptors built
//! in memory.

use std::collections::HashSet;
use std::path::Path;

use hdlplan_common::error::{HdlplanError, Result};
use hdlplan_common::types::Action;

use crate::descriptor::{ActionRule, Clause, Descriptor};

/// Validates a descriptor for semantic correctness.
///
/// # Checks performed
///
/// 1. The module name is not empty.
/// 2. No file, module reference, or variant path is empty or absolute.
/// 3. No two device rules of one platform can match the same device.
/// 4. No action is listed twice in one action table.
/// 5. Backend rules appear only under `simulation` and are not repeated.
/// 6. No variant name is declared twice.
///
/// # Errors
///
/// Returns an error describing the first failed check.
pub fn validate(desc: &Descriptor) -> Result<()> {
    tracing::debug!(module = %desc.name, "validating descriptor");
    if desc.name.trim().is_empty() {
        return Err(HdlplanError::manifest("module name must not be empty"));
    }
    check_clause(desc, &desc.base, "base")?;
    check_device_rules(desc)?;
    check_action_table(desc, &desc.actions, "module")?;
    check_variants(desc)?;
    Ok(())
}

fn invalid(desc: &Descriptor, message: String) -> HdlplanError {
    HdlplanError::manifest(format!("module \"{}\": {message}", desc.name))
}

/// Paths are relative to the module directory or the external root.
fn is_absolute(path: &str) -> bool {
    path.starts_with(['/', '\\']) || Path::new(path).is_absolute()
}

fn check_clause(desc: &Descriptor, clause: &Clause, location: &str) -> Result<()> {
    for file in &clause.files {
        if file.trim().is_empty() {
            return Err(invalid(desc, format!("empty file path in {location} clause")));
        }
        if is_absolute(file) {
            return Err(invalid(
                desc,
                format!("absolute file path \"{file}\" in {location} clause"),
            ));
        }
    }
    for module in &clause.modules {
        let path = module.path();
        if path.trim().is_empty() {
            return Err(invalid(desc, format!("empty module path in {location} clause")));
        }
        if is_absolute(path) {
            return Err(invalid(
                desc,
                format!("absolute module path \"{path}\" in {location} clause"),
            ));
        }
    }
    Ok(())
}

fn check_device_rules(desc: &Descriptor) -> Result<()> {
    for (idx, rule) in desc.devices.iter().enumerate() {
        let location = format!("DEVICE {} {}", rule.platform, rule.class);
        check_clause(desc, &rule.clause, &location)?;
        check_action_table(desc, &rule.actions, &location)?;

        let overlapping = desc.devices[..idx].iter().find(|earlier| {
            earlier.platform.eq_ignore_ascii_case(&rule.platform)
                && earlier.class.overlaps(&rule.class)
        });
        if let Some(earlier) = overlapping {
            return Err(invalid(
                desc,
                format!(
                    "device rule {} {} overlaps earlier rule {} {}",
                    rule.platform, rule.class, earlier.platform, earlier.class
                ),
            ));
        }
    }
    Ok(())
}

fn check_action_table(desc: &Descriptor, rules: &[ActionRule], location: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.action) {
            return Err(invalid(
                desc,
                format!("duplicate ACTION {} in {location}", rule.action),
            ));
        }
        let action_location = format!("{location} ACTION {}", rule.action);
        check_clause(desc, &rule.clause, &action_location)?;

        if rule.action != Action::Simulation && !rule.backends.is_empty() {
            return Err(invalid(
                desc,
                format!("BACKEND rules are only allowed under ACTION simulation ({action_location})"),
            ));
        }
        let mut backends = HashSet::new();
        for backend in &rule.backends {
            if !backends.insert(backend.backend.to_ascii_lowercase()) {
                return Err(invalid(
                    desc,
                    format!("duplicate BACKEND {} in {action_location}", backend.backend),
                ));
            }
            check_clause(desc, &backend.clause, &action_location)?;
        }
    }
    Ok(())
}

fn check_variants(desc: &Descriptor) -> Result<()> {
    let Some(variants) = &desc.variants else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    for variant in variants {
        if !seen.insert(variant.name.as_str()) {
            return Err(invalid(
                desc,
                format!("duplicate variant name: \"{}\"", variant.name),
            ));
        }
        if variant.file.trim().is_empty() {
            return Err(invalid(
                desc,
                format!("variant \"{}\" has an empty file path", variant.name),
            ));
        }
        if is_absolute(&variant.file) {
            return Err(invalid(
                desc,
                format!("variant \"{}\" has an absolute file path", variant.name),
            ));
        }
    }
    Ok(())
}
