//! `hdlplan graph` — Print the module reference graph in Graphviz DOT.

use clap::Args;
use hdlplan_common::config::HdlplanConfig;
use hdlplan_manifest::graph::ModuleGraph;

use super::plan::{self, TargetArgs};

/// Arguments for the `graph` command.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Root module and context.
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Executes the `graph` command.
///
/// Only modules selected under the given context appear in the graph.
/// Edges point from a referenced module to the module referencing it.
///
/// # Errors
///
/// Returns an error if resolution fails.
pub fn execute(args: &GraphArgs, config: &HdlplanConfig) -> anyhow::Result<()> {
    let resolved = plan::resolve(&args.target, config)?;
    let graph = ModuleGraph::from_plan(&resolved.plan);
    tracing::debug!(modules = graph.module_count(), "rendering module graph");
    print!("{}", graph.to_dot());
    Ok(())
}
