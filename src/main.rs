//! Command-line interface for the NAICS classification hierarchy.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
