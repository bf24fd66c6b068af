//! Datasource trait definition

use crate::error::DbResult;

/// One result row; `None` is SQL NULL.
pub type Row = Vec<Option<String>>;

/// Blocking handle to a database, consumed by the migration ledger and by
/// migration bodies.
///
/// Implementations must be Send + Sync so one handle can be shared by the
/// ledger and the runner.
pub trait Datasource: Send + Sync {
    /// Execute a single statement, returns affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return every row with each value rendered as text
    fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>>;

    /// First column of the first row, or `None` for no rows or NULL
    fn query_one(&self, sql: &str) -> DbResult<Option<String>> {
        Ok(self
            .query_rows(sql)?
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next().flatten()))
    }

    /// Check if a table or view exists
    fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
