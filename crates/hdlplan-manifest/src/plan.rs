//! The merged result of a resolution run.

use std::collections::HashSet;

use hdlplan_common::types::ScopedPath;
use serde::{Deserialize, Serialize};

/// A module that contributed to a build plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedModule {
    /// Module directory key.
    pub key: ScopedPath,
    /// Declared module name.
    pub name: String,
}

/// A reference edge discovered during the walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEdge {
    /// Referencing module.
    pub from: ScopedPath,
    /// Referenced module.
    pub to: ScopedPath,
}

/// Ordered, duplicate-free build set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    files: Vec<ScopedPath>,
    modules: Vec<PlannedModule>,
    references: Vec<ModuleEdge>,
}

impl BuildPlan {
    /// Files in compilation order.
    #[must_use]
    pub fn files(&self) -> &[ScopedPath] {
        &self.files
    }

    /// Contributing modules, in the order their files were emitted.
    #[must_use]
    pub fn modules(&self) -> &[PlannedModule] {
        &self.modules
    }

    /// Every module reference followed, in discovery order.
    #[must_use]
    pub fn references(&self) -> &[ModuleEdge] {
        &self.references
    }

    /// Files rendered as strings, in compilation order.
    #[must_use]
    pub fn file_strings(&self) -> Vec<String> {
        self.files.iter().map(ToString::to_string).collect()
    }

    /// Declared names of the contributing modules, in order.
    #[must_use]
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Accumulates a [`BuildPlan`] during a walk, dropping repeated files.
#[derive(Debug, Default)]
pub(crate) struct PlanBuilder {
    plan: BuildPlan,
    seen: HashSet<ScopedPath>,
}

impl PlanBuilder {
    /// Appends a file unless it is already present. Returns `true` if added.
    pub(crate) fn push_file(&mut self, file: ScopedPath) -> bool {
        if !self.seen.insert(file.clone()) {
            return false;
        }
        self.plan.files.push(file);
        true
    }

    pub(crate) fn push_module(&mut self, key: ScopedPath, name: String) {
        self.plan.modules.push(PlannedModule { key, name });
    }

    pub(crate) fn push_reference(&mut self, from: ScopedPath, to: ScopedPath) {
        self.plan.references.push(ModuleEdge { from, to });
    }

    pub(crate) fn finish(self) -> BuildPlan {
        self.plan
    }
}
