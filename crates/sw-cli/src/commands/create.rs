//! Create command implementation

use anyhow::{Context, Result};
use sw_core::{MigrationId, MigrationRecord};

use crate::cli::{CreateArgs, GlobalArgs};
use crate::commands::common::Project;

/// Execute the create command
///
/// Only touches the filesystem; no database connection is opened.
pub(crate) fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let record = create_migration(&project, &args.name)?;
    println!("Created migration {}", record.path.display());
    Ok(())
}

pub(crate) fn create_migration(project: &Project, name: &str) -> Result<MigrationRecord> {
    project
        .repository()
        .create(name, MigrationId::now())
        .with_context(|| format!("Failed to create migration '{name}'"))
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
