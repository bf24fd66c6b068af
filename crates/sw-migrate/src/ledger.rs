//! Persistent record of applied migrations.
//!
//! The ledger is a single append-only table:
//!
//! | column         | type                         |
//! |----------------|------------------------------|
//! | `id`           | surrogate key from a sequence|
//! | `migration_id` | `VARCHAR(14)` unique         |
//! | `created`      | `TIMESTAMP`                  |
//!
//! It is installed lazily, never dropped, and rows are never updated or
//! deleted.

use crate::error::{LedgerError, LedgerResult};
use chrono::NaiveDateTime;
use sw_core::MigrationId;
use sw_db::{Datasource, DbError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One applied migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Id of the applied migration
    pub migration_id: MigrationId,

    /// When it was recorded; `None` if the row has no timestamp
    pub applied_at: Option<NaiveDateTime>,
}

/// Ledger table on a datasource.
pub struct MigrationLedger<'a> {
    datasource: &'a dyn Datasource,
    table: String,
}

impl<'a> MigrationLedger<'a> {
    /// Create a ledger stored in `table` on `datasource`.
    ///
    /// `table` must already be prefixed and validated as an identifier.
    pub fn new(datasource: &'a dyn Datasource, table: impl Into<String>) -> Self {
        Self {
            datasource,
            table: table.into(),
        }
    }

    /// Fully-prefixed ledger table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether the ledger table exists.
    pub fn is_installed(&self) -> LedgerResult<bool> {
        self.datasource
            .relation_exists(&self.table)
            .map_err(|e| LedgerError::StorageUnavailable(format!("{}: {e}", self.table)))
    }

    /// Create the ledger table if it does not exist.
    ///
    /// Returns `true` when the table was created by this call and `false`
    /// when it was already installed.
    pub fn ensure_installed(&self) -> LedgerResult<bool> {
        if self.is_installed()? {
            return Ok(false);
        }

        let table = &self.table;
        self.datasource
            .execute_batch(&format!(
                "CREATE SEQUENCE IF NOT EXISTS {table}_id_seq;
                 CREATE TABLE IF NOT EXISTS {table} (
                     id           INTEGER PRIMARY KEY DEFAULT nextval('{table}_id_seq'),
                     migration_id VARCHAR(14) NOT NULL UNIQUE,
                     created      TIMESTAMP
                 );"
            ))
            .map_err(|e| {
                LedgerError::StorageUnavailable(format!("failed to create {table}: {e}"))
            })?;

        log::info!("Installed migration ledger table {table}");
        Ok(true)
    }

    /// Whether `id` has been recorded as applied.
    pub fn is_applied(&self, id: &MigrationId) -> LedgerResult<bool> {
        let count = self
            .datasource
            .query_one(&format!(
                "SELECT COUNT(*) FROM {} WHERE migration_id = '{id}'",
                self.table
            ))
            .map_err(|e| LedgerError::Query(format!("failed to look up {id}: {e}")))?;
        let count: i64 = count
            .as_deref()
            .unwrap_or("0")
            .parse()
            .map_err(|e| LedgerError::Query(format!("unexpected COUNT result: {e}")))?;
        Ok(count > 0)
    }

    /// Highest applied migration id, or `None` when nothing has been applied.
    pub fn latest_applied_id(&self) -> LedgerResult<Option<MigrationId>> {
        let latest = self
            .datasource
            .query_one(&format!("SELECT MAX(migration_id) FROM {}", self.table))
            .map_err(|e| LedgerError::Query(format!("failed to read latest migration: {e}")))?;
        latest
            .map(|s| parse_stored_id(s.trim()))
            .transpose()
    }

    /// Append an entry for `id`.
    ///
    /// Fails with [`LedgerError::DuplicateMigration`] if `id` is already
    /// present, whether caught by the lookup or by the table's unique
    /// constraint.
    pub fn record_applied(&self, id: &MigrationId, applied_at: NaiveDateTime) -> LedgerResult<()> {
        if self.is_applied(id)? {
            return Err(LedgerError::DuplicateMigration { id: id.clone() });
        }

        let created = applied_at.format(TIMESTAMP_FORMAT);
        let result = self.datasource.execute(&format!(
            "INSERT INTO {} (migration_id, created) VALUES ('{id}', TIMESTAMP '{created}')",
            self.table
        ));
        match result {
            Ok(_) => {
                log::debug!("Recorded migration {id} in {}", self.table);
                Ok(())
            }
            Err(DbError::ConstraintViolation(_)) => {
                Err(LedgerError::DuplicateMigration { id: id.clone() })
            }
            Err(e) => Err(LedgerError::Query(format!("failed to record {id}: {e}"))),
        }
    }

    /// Every entry, ascending by migration id.
    pub fn entries(&self) -> LedgerResult<Vec<LedgerEntry>> {
        let rows = self
            .datasource
            .query_rows(&format!(
                "SELECT migration_id, CAST(created AS VARCHAR) FROM {} ORDER BY migration_id",
                self.table
            ))
            .map_err(|e| LedgerError::Query(format!("failed to list ledger entries: {e}")))?;

        rows.into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let id = cells.next().flatten().unwrap_or_default();
                let created = cells.next().flatten();
                Ok(LedgerEntry {
                    migration_id: parse_stored_id(id.trim())?,
                    applied_at: created.and_then(|c| parse_timestamp(&c)),
                })
            })
            .collect()
    }
}

fn parse_stored_id(s: &str) -> LedgerResult<MigrationId> {
    MigrationId::parse(s).map_err(|e| LedgerError::Query(e.to_string()))
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    // DuckDB appends fractional seconds only when they are non-zero
    let whole_seconds = s.split('.').next().unwrap_or(s);
    NaiveDateTime::parse_from_str(whole_seconds, TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
