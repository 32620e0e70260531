//! `hdlplan plan` — Resolve a module tree and print the build plan.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use hdlplan_common::config::{BackendPolicy, HdlplanConfig, TraversalOrder};
use hdlplan_common::types::ScopedPath;
use hdlplan_manifest::parser::ast::BuildSettings;
use hdlplan_manifest::{BuildPlan, Context, ManifestLoader, RawContext, ResolveOptions, Resolver};
use serde::Serialize;

use crate::output;

/// Module selection and context flags shared by resolving commands.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Directory of the root module, relative to the project root.
    #[arg(default_value = ".")]
    pub module: String,

    /// Project root that local module paths resolve against.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Target platform family (e.g. "xilinx").
    #[arg(long)]
    pub platform: Option<String>,

    /// Target device identifier (e.g. "xc6vlx240t").
    #[arg(long)]
    pub device: Option<String>,

    /// Build action: synthesis or simulation.
    #[arg(long)]
    pub action: Option<String>,

    /// Simulator backend, required for simulation.
    #[arg(long)]
    pub sim_backend: Option<String>,

    /// Variant selector to enable. Repeatable.
    #[arg(long)]
    pub variant: Vec<String>,

    /// Emit a module's files after the files of the modules it references.
    #[arg(long)]
    pub children_first: bool,

    /// Fail when a backend table has no entry for the simulator backend.
    #[arg(long)]
    pub strict_backends: bool,
}

impl TargetArgs {
    /// Context fields given on the command line; unset fields are empty.
    fn raw_context(&self) -> RawContext {
        RawContext {
            platform: self.platform.clone().unwrap_or_default(),
            device: self.device.clone().unwrap_or_default(),
            action: self.action.clone().unwrap_or_default(),
            sim_backend: self.sim_backend.clone(),
            variants: self.variant.clone(),
        }
    }

    fn options(&self, config: &HdlplanConfig) -> ResolveOptions {
        let mut options = ResolveOptions::from(config);
        if self.children_first {
            options.traversal = TraversalOrder::ChildrenFirst;
        }
        if self.strict_backends {
            options.backend_policy = BackendPolicy::Strict;
        }
        options
    }
}

/// Output format of the `plan` command.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable listing.
    #[default]
    Text,
    /// JSON document with the context and the plan.
    Json,
}

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Root module and context.
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// A successful resolution with the inputs that produced it.
pub struct Resolved {
    /// Key of the root module.
    pub root: ScopedPath,
    /// The `BUILD` block of the root manifest, if any.
    pub build: Option<BuildSettings>,
    /// Effective context after merging flags and `BUILD` defaults.
    pub context: Context,
    /// The resolved plan.
    pub plan: BuildPlan,
}

#[derive(Serialize)]
struct PlanReport<'a> {
    root: String,
    context: RawContext,
    build: Option<&'a BuildSettings>,
    plan: &'a BuildPlan,
}

/// Resolves the module tree selected by `target`.
///
/// Context fields missing from the command line are taken from the root
/// manifest's `BUILD` block.
///
/// # Errors
///
/// Returns an error if the root manifest cannot be read, or a rendered
/// diagnostic if the context is invalid or resolution fails.
pub fn resolve(target: &TargetArgs, config: &HdlplanConfig) -> anyhow::Result<Resolved> {
    let loader = ManifestLoader::from_config(&target.root, config);
    let root = ScopedPath::local(&target.module);
    let manifest = loader.read(&root)?;

    let mut raw = target.raw_context();
    if let Some(build) = &manifest.build {
        raw = raw.or(&build.context_defaults());
    }
    let context = Context::validate(&raw)
        .map_err(|d| anyhow::anyhow!("{}", output::render_diagnostic(&d)))?;

    let plan = Resolver::new(&loader)
        .with_options(target.options(config))
        .resolve(std::slice::from_ref(&root), &context)
        .map_err(|d| anyhow::anyhow!("{}", output::render_diagnostic(&d)))?;

    Ok(Resolved {
        root,
        build: manifest.build,
        context,
        plan,
    })
}

/// Executes the `plan` command.
///
/// # Errors
///
/// Returns an error if resolution fails or the plan cannot be serialized.
pub fn execute(args: &PlanArgs, config: &HdlplanConfig) -> anyhow::Result<()> {
    let resolved = resolve(&args.target, config)?;
    match args.format {
        OutputFormat::Text => print!("{}", output::render_plan(&resolved)),
        OutputFormat::Json => {
            let report = PlanReport {
                root: resolved.root.to_string(),
                context: resolved.context.snapshot(),
                build: resolved.build.as_ref(),
                plan: &resolved.plan,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn demo_target(module: &str) -> TargetArgs {
        TargetArgs {
            module: module.into(),
            root: Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/fofb"),
            platform: None,
            device: None,
            action: None,
            sim_backend: None,
            variant: Vec::new(),
            children_first: false,
            strict_backends: false,
        }
    }

    #[test]
    fn build_block_fills_missing_flags() {
        let resolved =
            resolve(&demo_target("sim/fofb_cc_fod/do"), &HdlplanConfig::default()).expect("resolves");
        assert_eq!(resolved.context.device(), "xc7a200t");
        assert_eq!(resolved.context.sim_backend(), Some("modelsim"));
        assert_eq!(resolved.plan.files().len(), 8);
    }

    #[test]
    fn flags_override_build_block() {
        let mut target = demo_target("sim/fofb_cc_arbmux/do");
        target.device = Some("xc6vlx240t".into());
        let resolved = resolve(&target, &HdlplanConfig::default()).expect("resolves");
        assert_eq!(resolved.context.device(), "xc6vlx240t");
        assert!(
            resolved
                .plan
                .file_strings()
                .contains(&"rtl/fofb_cc_rx_fifo/coregen/virtex6/fofb_cc_rx_fifo.vhd".to_string())
        );
    }

    #[test]
    fn missing_context_is_reported() {
        let err = resolve(&demo_target("rtl"), &HdlplanConfig::default())
            .err()
            .expect("no action given");
        assert!(err.to_string().contains("invalid action"), "got: {err}");
    }

    #[test]
    fn flags_override_config_options() {
        let mut target = demo_target(".");
        target.children_first = true;
        target.strict_backends = true;
        let options = target.options(&HdlplanConfig::default());
        assert_eq!(options.traversal, TraversalOrder::ChildrenFirst);
        assert_eq!(options.backend_policy, BackendPolicy::Strict);
    }
}
