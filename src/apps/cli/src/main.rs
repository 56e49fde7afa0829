//! Stashkit command-line front end.

mod cli;
mod commands;
mod logging;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let level = logging::init_logging(cli.verbose);
    tracing::debug!("Log level: {}", logging::level_to_str(level));

    commands::run(cli)
}
