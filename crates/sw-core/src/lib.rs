//! sw-core - Core library for Stepwise
//!
//! This crate provides the shared migration types (ids and file records),
//! the migration file repository and template, and `stepwise.yml`
//! configuration parsing used across all Stepwise components.

pub mod config;
pub mod error;
pub mod migration;
pub mod migration_id;
pub mod repository;
pub mod template;

pub use config::{Config, ConnectionConfig, DbType, LedgerConfig};
pub use error::{CoreError, CoreResult};
pub use migration::MigrationRecord;
pub use migration_id::MigrationId;
pub use repository::MigrationRepository;
pub use template::MigrationSections;
