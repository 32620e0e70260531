//! Depth-first resolution of a module tree into a [`BuildPlan`].
//!
//! Descriptors are obtained through a [`DescriptorSource`], evaluated
//! against the run's [`Context`], and their files merged into one ordered,
//! duplicate-free plan. Any failure aborts the run; partial plans are never
//! returned.

use std::collections::HashMap;
use std::sync::Arc;

use hdlplan_common::config::{BackendPolicy, HdlplanConfig, TraversalOrder};
use hdlplan_common::error::{HdlplanError, Result};
use hdlplan_common::types::ScopedPath;

use crate::context::Context;
use crate::descriptor::Descriptor;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::evaluate::evaluate;
use crate::plan::{BuildPlan, PlanBuilder};

/// Supplies the descriptor of a module given its key.
pub trait DescriptorSource {
    /// Loads the descriptor of the module at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the module does not exist or cannot be read.
    fn load(&self, key: &ScopedPath) -> Result<Arc<Descriptor>>;
}

/// In-memory descriptor source.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    descriptors: HashMap<ScopedPath, Arc<Descriptor>>,
}

impl DescriptorSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under `key`, returning the one it replaces.
    pub fn insert(&mut self, key: ScopedPath, descriptor: Descriptor) -> Option<Arc<Descriptor>> {
        self.descriptors.insert(key, Arc::new(descriptor))
    }

    /// Builder form of [`Self::insert`] for local keys.
    #[must_use]
    pub fn with(mut self, key: &str, descriptor: Descriptor) -> Self {
        let _ = self.insert(ScopedPath::local(key), descriptor);
        self
    }

    /// Number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if no descriptor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl DescriptorSource for DescriptorSet {
    fn load(&self, key: &ScopedPath) -> Result<Arc<Descriptor>> {
        self.descriptors
            .get(key)
            .cloned()
            .ok_or_else(|| HdlplanError::NotFound {
                kind: "module",
                id: key.to_string(),
            })
    }
}

/// Knobs of a resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// File/children emission order.
    pub traversal: TraversalOrder,
    /// Treatment of unmatched simulator backends.
    pub backend_policy: BackendPolicy,
}

impl From<&HdlplanConfig> for ResolveOptions {
    fn from(config: &HdlplanConfig) -> Self {
        Self {
            traversal: config.traversal,
            backend_policy: config.backend_policy,
        }
    }
}

/// Resolves module trees drawn from one descriptor source.
///
/// A resolver holds no per-run state, so one instance can serve any number
/// of runs, including concurrent ones.
#[derive(Debug)]
pub struct Resolver<'a, S: ?Sized> {
    source: &'a S,
    options: ResolveOptions,
}

impl<'a, S: DescriptorSource + ?Sized> Resolver<'a, S> {
    /// Creates a resolver with default options.
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            options: ResolveOptions::default(),
        }
    }

    /// Replaces the run options.
    #[must_use]
    pub const fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves `roots`, in order, into one build plan.
    ///
    /// Modules reachable from several roots or parents are resolved once.
    ///
    /// # Errors
    ///
    /// Returns the first [`Diagnostic`] encountered: an evaluation failure
    /// or load failure attributed to the module and its reference path, or
    /// a `CyclicModuleReference`. Variant selectors that no resolved module
    /// declares are reported as `UnknownVariant`.
    pub fn resolve(
        &self,
        roots: &[ScopedPath],
        context: &Context,
    ) -> std::result::Result<BuildPlan, Diagnostic> {
        tracing::info!(
            roots = roots.len(),
            platform = context.platform(),
            device = context.device(),
            action = %context.action(),
            "resolving build plan"
        );

        let mut walk = Walk {
            source: self.source,
            options: self.options,
            context,
            states: HashMap::new(),
            names: HashMap::new(),
            trail: Vec::new(),
            plan: PlanBuilder::default(),
            variant_tables: 0,
        };
        for root in roots {
            walk.visit(root)?;
        }

        if walk.variant_tables == 0 {
            if let Some(name) = context.variants().first() {
                return Err(Diagnostic::new(
                    DiagnosticKind::UnknownVariant { name: name.clone() },
                    context.snapshot(),
                ));
            }
        }

        let plan = walk.plan.finish();
        tracing::info!(
            files = plan.files().len(),
            modules = plan.modules().len(),
            "build plan resolved"
        );
        Ok(plan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// Per-run traversal state.
struct Walk<'r, S: ?Sized> {
    source: &'r S,
    options: ResolveOptions,
    context: &'r Context,
    states: HashMap<ScopedPath, VisitState>,
    names: HashMap<ScopedPath, String>,
    trail: Vec<ScopedPath>,
    plan: PlanBuilder,
    variant_tables: usize,
}

impl<S: DescriptorSource + ?Sized> Walk<'_, S> {
    fn visit(&mut self, key: &ScopedPath) -> std::result::Result<(), Diagnostic> {
        match self.states.get(key) {
            Some(VisitState::Done) => return Ok(()),
            Some(VisitState::InProgress) => {
                let mut path = self.trail_strings();
                path.push(key.to_string());
                let module = self.names.get(key).cloned();
                return Err(self.fail(DiagnosticKind::CyclicModuleReference { path }, module));
            }
            None => {}
        }

        let _ = self.states.insert(key.clone(), VisitState::InProgress);
        self.trail.push(key.clone());
        tracing::debug!(module = %key, depth = self.trail.len(), "visiting module");

        let descriptor = self.source.load(key).map_err(|e| {
            self.fail(
                DiagnosticKind::ManifestUnavailable {
                    reason: e.to_string(),
                },
                None,
            )
        })?;
        let _ = self.names.insert(key.clone(), descriptor.name.clone());

        let selection = evaluate(&descriptor, self.context, self.options.backend_policy)
            .map_err(|kind| self.fail(kind, Some(descriptor.name.clone())))?;
        if descriptor.variants.is_some() {
            self.variant_tables += 1;
        }

        let children: Vec<ScopedPath> = selection
            .modules
            .iter()
            .map(|m| m.resolve_from(key))
            .collect();
        for child in &children {
            self.plan.push_reference(key.clone(), child.clone());
        }

        match self.options.traversal {
            TraversalOrder::FilesFirst => {
                self.emit(key, &descriptor.name, &selection.files);
                for child in &children {
                    self.visit(child)?;
                }
            }
            TraversalOrder::ChildrenFirst => {
                for child in &children {
                    self.visit(child)?;
                }
                self.emit(key, &descriptor.name, &selection.files);
            }
        }

        let _ = self.trail.pop();
        let _ = self.states.insert(key.clone(), VisitState::Done);
        Ok(())
    }

    fn emit(&mut self, key: &ScopedPath, name: &str, files: &[String]) {
        self.plan.push_module(key.clone(), name.to_owned());
        for file in files {
            let path = key.join(file);
            if !self.plan.push_file(path.clone()) {
                tracing::trace!(file = %path, module = name, "duplicate file dropped");
            }
        }
    }

    fn trail_strings(&self) -> Vec<String> {
        self.trail.iter().map(ToString::to_string).collect()
    }

    fn fail(&self, kind: DiagnosticKind, module: Option<String>) -> Diagnostic {
        Diagnostic::new(kind, self.context.snapshot()).in_module(module, self.trail_strings())
    }
}
