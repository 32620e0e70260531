//! # hdlplan-manifest
//!
//! Resolution engine for context-dependent HDL module manifests.
//!
//! Handles:
//! - **Context**: validation of the platform/device/action/backend/variant
//!   fields a run is evaluated against.
//! - **Descriptor**: per-module first-match rule tables and their evaluation.
//! - **Resolver**: depth-first walk of module references into one ordered,
//!   duplicate-free [`plan::BuildPlan`], with cycle detection.
//! - **Diagnostics**: typed failures attributed to a module and reference path.
//! - **Parser**: lexing, parsing, and validation of `.hdm` manifest files.
//! - **Loader**: reading manifests from a project tree.
//! - **Graph**: the module reference graph, for inspection and DOT export.

pub mod context;
pub mod descriptor;
pub mod diagnostic;
pub mod evaluate;
pub mod graph;
pub mod loader;
pub mod parser;
pub mod plan;
pub mod resolver;

pub use context::{Context, RawContext};
pub use descriptor::{ActionRule, BackendRule, Descriptor, DeviceClass, DeviceRule, ModuleRef};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use loader::ManifestLoader;
pub use plan::BuildPlan;
pub use resolver::{DescriptorSet, DescriptorSource, ResolveOptions, Resolver};
