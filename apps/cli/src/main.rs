//! Sparkle CLI: context-aware prompt enrichment from the terminal.
//!
//! Drives the enrichment pipeline over local HTML or document snapshots and
//! serves the JSON-lines request boundary for hosts.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
