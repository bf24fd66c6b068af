//! DuckDB datasource implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Datasource, Row};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB datasource
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

/// Read a column value as a String, trying multiple DuckDB types.
///
/// DuckDB integer columns return `None` for `Option<String>`, so we try
/// String -> i64 -> f64 -> bool, and only then treat the value as NULL.
fn get_column_as_string(row: &duckdb::Row<'_>, idx: usize) -> Option<String> {
    if let Ok(Some(s)) = row.get::<_, Option<String>>(idx) {
        return Some(s);
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return Some(n.to_string());
    }
    if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
        return Some(f.to_string());
    }
    if let Ok(Some(b)) = row.get::<_, Option<bool>>(idx) {
        return Some(b.to_string());
    }
    None
}

impl Datasource for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        log::debug!("duckdb execute: {sql}");
        let conn = self.lock()?;
        Ok(conn.execute(sql, [])?)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        log::debug!("duckdb execute_batch: {sql}");
        let conn = self.lock()?;
        Ok(conn.execute_batch(sql)?)
    }

    fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count)
                    .map(|i| get_column_as_string(row, i))
                    .collect::<Row>())
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        // Handle schema-qualified names
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };

        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            duckdb::params![schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
