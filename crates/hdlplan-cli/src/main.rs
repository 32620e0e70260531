//! # hdlplan — HDL build plan resolver
//!
//! Evaluates a tree of `.hdm` module manifests against a target
//! platform, device, and build action, and prints the ordered,
//! duplicate-free list of source files to compile.

mod commands;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
        )
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
