//! Stepwise CLI - timestamped schema migrations with a database ledger

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{create, run, status, upgrade_all};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Create(args) => create::execute(args, &cli.global),
        cli::Commands::Run(args) => run::execute(args, &cli.global),
        cli::Commands::UpgradeAll(args) => upgrade_all::execute(args, &cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
    }
}

/// `warn` by default, `info` with `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
