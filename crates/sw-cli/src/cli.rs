//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stepwise - timestamped schema migrations tracked in a database ledger
#[derive(Parser, Debug)]
#[command(name = "sw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty migration file
    Create(CreateArgs),

    /// Apply a single migration by id
    Run(RunArgs),

    /// Apply every migration newer than the latest applied one
    UpgradeAll(UpgradeAllArgs),

    /// Show every migration file and whether it has been applied
    Status(StatusArgs),
}

/// Connection selection shared by commands that open a database
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Named connection from stepwise.yml (falls back to SW_CONNECTION, then "default")
    #[arg(short, long)]
    pub connection: Option<String>,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Migration name (letters, digits, '_' and '-')
    pub name: String,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// 14-digit migration id (YYYYMMDDHHMMSS)
    pub id: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Arguments for the upgrade-all command
#[derive(Args, Debug)]
pub struct UpgradeAllArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Aligned table
    Table,
    /// JSON array
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
