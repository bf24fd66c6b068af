//! Migration bodies and the registry that maps migration files to them.
//!
//! A migration file is resolved by name first: anything registered with
//! [`MigrationRegistry::register`] wins. Otherwise, unless the registry was
//! built with [`MigrationRegistry::registered_only`], the file itself is read
//! as a SQL migration with `-- upgrade` / `-- downgrade` sections. A SQL file
//! without an upgrade marker line refuses to run, so it is never recorded.

use crate::error::{RunnerError, RunnerResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use sw_core::template::{self, MigrationSections, UPGRADE_MARKER};
use sw_core::{CoreError, CoreResult, MigrationRecord};
use sw_db::Datasource;

/// Error type returned by migration bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A unit of schema change.
///
/// Only [`upgrade`](Migration::upgrade) is ever invoked by the runner.
pub trait Migration: Send + Sync {
    /// Apply the change.
    fn upgrade(&self, datasource: &dyn Datasource) -> Result<(), BoxError>;

    /// Undo the change.
    fn downgrade(&self, _datasource: &dyn Datasource) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Migration backed by the sections of a SQL migration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlMigration {
    sections: MigrationSections,
}

impl SqlMigration {
    /// Parse migration file content.
    pub fn from_sql(content: &str) -> Self {
        Self {
            sections: template::split_sections(content),
        }
    }

    /// Read and parse a migration file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::from_sql(&content))
    }

    fn run_section(sql: &str, datasource: &dyn Datasource) -> Result<(), BoxError> {
        if !template::has_statements(sql) {
            return Ok(());
        }
        datasource.execute_batch(sql)?;
        Ok(())
    }
}

impl Migration for SqlMigration {
    fn upgrade(&self, datasource: &dyn Datasource) -> Result<(), BoxError> {
        if !self.sections.has_upgrade {
            return Err(format!("no '{UPGRADE_MARKER}' marker line found").into());
        }
        Self::run_section(&self.sections.upgrade, datasource)
    }

    fn downgrade(&self, datasource: &dyn Datasource) -> Result<(), BoxError> {
        Self::run_section(&self.sections.downgrade, datasource)
    }
}

/// Maps migration names to their implementations.
pub struct MigrationRegistry {
    migrations: HashMap<String, Arc<dyn Migration>>,
    load_sql_files: bool,
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationRegistry {
    /// Registry that falls back to reading unregistered files as SQL.
    pub fn new() -> Self {
        Self {
            migrations: HashMap::new(),
            load_sql_files: true,
        }
    }

    /// Registry that only resolves explicitly registered migrations.
    pub fn registered_only() -> Self {
        Self {
            migrations: HashMap::new(),
            load_sql_files: false,
        }
    }

    /// Register `migration` for files named `<id>-{name}.<ext>`.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register(mut self, name: impl Into<String>, migration: impl Migration + 'static) -> Self {
        let name = name.into();
        if self
            .migrations
            .insert(name.clone(), Arc::new(migration))
            .is_some()
        {
            log::warn!("Migration '{name}' registered more than once; keeping the last one");
        }
        self
    }

    /// Find the implementation for a migration file.
    pub fn resolve(&self, record: &MigrationRecord) -> RunnerResult<Arc<dyn Migration>> {
        if let Some(migration) = self.migrations.get(&record.name) {
            return Ok(Arc::clone(migration));
        }
        if self.load_sql_files {
            let migration = SqlMigration::from_file(&record.path)?;
            return Ok(Arc::new(migration));
        }
        Err(RunnerError::Unresolved {
            id: record.id.clone(),
            name: record.name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
