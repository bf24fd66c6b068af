//! sw-db - Datasource abstraction layer for Stepwise
//!
//! This crate provides the blocking [`Datasource`] trait consumed by the
//! migration ledger and by migration bodies, plus its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Datasource, Row};

use std::path::Path;
use sw_core::{ConnectionConfig, DbType};

/// Open the datasource described by a connection config.
///
/// Relative database paths are resolved against `root`.
pub fn connect(config: &ConnectionConfig, root: &Path) -> DbResult<Box<dyn Datasource>> {
    match config.db_type {
        DbType::DuckDb => {
            let path = config.path_absolute(root);
            log::debug!("Opening duckdb datasource at {path}");
            Ok(Box::new(DuckDbBackend::new(&path)?))
        }
    }
}
