//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::path::PathBuf;
use sw_core::{Config, ConnectionConfig, MigrationRepository};
use sw_db::Datasource;
use sw_migrate::{MigrationLedger, MigrationRegistry, MigrationRunner};

use crate::cli::{ConnectionArgs, GlobalArgs};

/// A loaded project: its configuration and the directory it was found in.
pub(crate) struct Project {
    pub(crate) config: Config,
    pub(crate) root: PathBuf,
}

impl Project {
    /// Load `stepwise.yml` from the project directory given on the command line.
    pub(crate) fn load(global: &GlobalArgs) -> Result<Self> {
        let root = global.project_dir.clone();
        let config = Config::load_from_dir(&root).context("Failed to load project")?;
        Ok(Self { config, root })
    }

    /// Migration files live under the configured migration path.
    pub(crate) fn repository(&self) -> MigrationRepository {
        MigrationRepository::from_config(&self.config, &self.root)
    }

    /// Open the selected connection and make sure its ledger table exists.
    ///
    /// Failing to reach or install the ledger is fatal: no migration is
    /// attempted against a database whose history cannot be read.
    pub(crate) fn open(&self, args: &ConnectionArgs) -> Result<Session> {
        let connection = Config::resolve_connection(args.connection.as_deref());
        let conn_config = self
            .config
            .connection(&connection)
            .context("Failed to get connection configuration")?;
        let ledger_table = self.config.ledger_table(&connection)?;
        if let Some(warning) = in_memory_warning(&connection, conn_config) {
            log::warn!("{warning}");
        }

        let datasource = sw_db::connect(conn_config, &self.root)
            .with_context(|| format!("Failed to open connection '{connection}'"))?;
        log::info!("Opened {} connection '{connection}'", datasource.db_type());

        let session = Session {
            connection,
            ledger_table,
            repository: self.repository(),
            datasource,
        };
        if session.ledger().ensure_installed().with_context(|| {
            format!(
                "Migration ledger '{}' is unavailable on connection '{}'",
                session.ledger_table, session.connection
            )
        })? {
            println!(
                "Installed migration ledger '{}' on connection '{}'",
                session.ledger_table, session.connection
            );
        }
        Ok(session)
    }
}

/// Warning for a connection whose schema and ledger vanish on exit.
pub(crate) fn in_memory_warning(connection: &str, config: &ConnectionConfig) -> Option<String> {
    config.is_in_memory().then(|| {
        format!(
            "Connection '{connection}' uses an in-memory database; applied migrations \
             and the ledger are discarded when sw exits. Set connections.{connection}.path \
             in stepwise.yml to keep them."
        )
    })
}

/// An open connection with an installed ledger.
pub(crate) struct Session {
    pub(crate) connection: String,
    pub(crate) ledger_table: String,
    repository: MigrationRepository,
    datasource: Box<dyn Datasource>,
}

impl Session {
    fn ledger(&self) -> MigrationLedger<'_> {
        MigrationLedger::new(self.datasource.as_ref(), self.ledger_table.as_str())
    }

    /// Runner over this session's connection, resolving bodies from SQL files.
    pub(crate) fn runner(&self) -> MigrationRunner<'_> {
        MigrationRunner::new(
            self.datasource.as_ref(),
            self.repository.clone(),
            self.ledger(),
            MigrationRegistry::new(),
        )
    }
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Render a left-aligned table: header row, dash separator, data rows.
///
/// Columns are separated by two spaces; trailing padding is trimmed.
pub(crate) fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = calculate_column_widths(headers, rows);
    let render = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(headers.iter().map(|h| h.to_string()).collect()));
    lines.push(render(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        lines.push(render(row.clone()));
    }
    lines.join("\n")
}

/// Print a formatted table to stdout.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", format_table(headers, rows));
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
