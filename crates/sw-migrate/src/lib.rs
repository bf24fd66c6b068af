//! Migration ledger and runner for Stepwise.
//!
//! The ledger is a table in the target database recording which migration
//! ids have been applied. The runner discovers migration files, resolves
//! them to [`Migration`] implementations, and applies them one at a time,
//! recording each success in the ledger.

pub mod error;
pub mod ledger;
pub mod migration;
pub mod runner;

pub use error::{LedgerError, LedgerResult, RunnerError, RunnerResult};
pub use ledger::{LedgerEntry, MigrationLedger};
pub use migration::{BoxError, Migration, MigrationRegistry, SqlMigration};
pub use runner::{MigrationRunner, MigrationState, MigrationStatus, RunOutcome, UpgradeReport};
