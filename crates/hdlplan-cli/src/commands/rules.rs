//! `hdlplan rules` — Print the rule tables of one module manifest.

use std::path::PathBuf;

use clap::Args;
use hdlplan_common::config::HdlplanConfig;
use hdlplan_common::types::ScopedPath;
use hdlplan_manifest::ManifestLoader;

use crate::output;

/// Arguments for the `rules` command.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Directory of the module, relative to the project root.
    #[arg(default_value = ".")]
    pub module: String,

    /// Project root that local module paths resolve against.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

/// Executes the `rules` command.
///
/// Reads and validates the manifest without evaluating it, so every rule
/// is listed regardless of context.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed, or validated.
pub fn execute(args: &RulesArgs, config: &HdlplanConfig) -> anyhow::Result<()> {
    let loader = ManifestLoader::from_config(&args.root, config);
    let key = ScopedPath::local(&args.module);
    let manifest = loader.read(&key)?;

    println!("Module {} ({key})", manifest.descriptor.name);
    if let Some(build) = &manifest.build {
        print!("{}", output::render_build_settings(build));
    }
    print!("{}", output::render_rules(&manifest.descriptor));
    Ok(())
}
