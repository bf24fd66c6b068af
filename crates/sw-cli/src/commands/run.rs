//! Run command implementation

use anyhow::{Context, Result};
use sw_core::MigrationId;
use sw_migrate::RunOutcome;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::Project;

/// Execute the run command
pub(crate) fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let id = MigrationId::parse(args.id.as_str()).context("Invalid migration id")?;
    let project = Project::load(global)?;
    let session = project.open(&args.connection)?;

    let outcome = session
        .runner()
        .run(&id)
        .with_context(|| format!("Migration {id} failed on connection '{}'", session.connection))?;

    match outcome {
        RunOutcome::Applied(record) => println!("Applied {}", record.file_name()),
        RunOutcome::AlreadyApplied(id) => println!("Migration {id} has already been applied"),
    }
    Ok(())
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
