//! Upgrade-all command implementation

use anyhow::{Context, Result};
use sw_migrate::RunnerError;

use crate::cli::{GlobalArgs, UpgradeAllArgs};
use crate::commands::common::Project;

/// Execute the upgrade-all command
pub(crate) fn execute(args: &UpgradeAllArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let session = project.open(&args.connection)?;

    let report = match session.runner().upgrade_all() {
        Ok(report) => report,
        Err(err) => {
            if let RunnerError::UpgradeHalted { applied, .. } = &err {
                for id in applied {
                    println!("  Applied {id}");
                }
            }
            return Err(err).context(format!(
                "Upgrade of connection '{}' stopped",
                session.connection
            ));
        }
    };

    if report.is_up_to_date() {
        println!("Connection '{}' is already up to date", session.connection);
        return Ok(());
    }

    for record in &report.applied {
        println!("  Applied {}", record.file_name());
    }
    println!(
        "\nApplied {} migration{} to connection '{}'",
        report.applied.len(),
        if report.applied.len() == 1 { "" } else { "s" },
        session.connection
    );
    Ok(())
}

#[cfg(test)]
#[path = "upgrade_all_test.rs"]
mod tests;
