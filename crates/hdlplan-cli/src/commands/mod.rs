//! CLI command definitions and dispatch.

pub mod graph;
pub mod plan;
pub mod rules;

use std::path::Path;

use anyhow::bail;
use clap::{Parser, Subcommand};
use hdlplan_common::config::HdlplanConfig;
use hdlplan_common::constants::{BIN_NAME, CONFIG_FILE_NAME};

/// hdlplan — Resolve HDL module manifests into build plans.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the JSON configuration file. Defaults to `hdlplan.json`
    /// in the working directory when that file exists.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a module tree and print the build plan.
    Plan(plan::PlanArgs),
    /// Print the rule tables of one module manifest.
    Rules(rules::RulesArgs),
    /// Resolve a module tree and print its reference graph as DOT.
    Graph(graph::GraphArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref().map(Path::new))?;
    match cli.command {
        Command::Plan(args) => plan::execute(&args, &config),
        Command::Rules(args) => rules::execute(&args, &config),
        Command::Graph(args) => graph::execute(&args, &config),
    }
}

/// Loads the configuration file.
///
/// An explicit path must exist. Without one, the default file is read if
/// present and defaults are used otherwise.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<HdlplanConfig> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            bail!("configuration file not found: {}", path.display());
        }
        Some(path) => path,
        None => {
            let path = Path::new(CONFIG_FILE_NAME);
            if !path.exists() {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(HdlplanConfig::default());
            }
            path
        }
    };
    tracing::info!(path = %path.display(), "loading configuration");
    Ok(HdlplanConfig::load(path)?)
}
