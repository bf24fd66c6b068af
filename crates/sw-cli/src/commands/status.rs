//! Status command implementation

use anyhow::Result;
use serde::Serialize;
use sw_migrate::{MigrationState, MigrationStatus};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{print_table, Project};

/// One line of status output.
#[derive(Debug, Serialize)]
pub(crate) struct StatusRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) state: String,
    pub(crate) applied_at: Option<String>,
}

impl From<&MigrationStatus> for StatusRow {
    fn from(status: &MigrationStatus) -> Self {
        Self {
            id: status.record.id.to_string(),
            name: status.record.name.clone(),
            state: status.state.to_string(),
            applied_at: status
                .applied_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let session = project.open(&args.connection)?;
    let statuses = session.runner().status()?;
    let rows: Vec<StatusRow> = statuses.iter().map(StatusRow::from).collect();

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        StatusOutput::Table => {
            if rows.is_empty() {
                println!("No migrations found in {}", project.repository().dir().display());
                return Ok(());
            }
            let table: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.id.clone(),
                        r.name.clone(),
                        r.state.clone(),
                        r.applied_at.clone().unwrap_or_else(|| "-".to_string()),
                    ]
                })
                .collect();
            print_table(&["ID", "NAME", "STATE", "APPLIED AT"], &table);
            println!("\n{}", summarize(&statuses));
        }
    }
    Ok(())
}

/// One-line count of migrations per state.
pub(crate) fn summarize(statuses: &[MigrationStatus]) -> String {
    let count = |state: MigrationState| statuses.iter().filter(|s| s.state == state).count();
    format!(
        "{} applied, {} pending, {} skipped",
        count(MigrationState::Applied),
        count(MigrationState::Pending),
        count(MigrationState::Skipped)
    )
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
