//! Error types for the migration ledger and runner.

use sw_core::{CoreError, MigrationId};
use thiserror::Error;

/// Ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The ledger table could not be verified or created (L001).
    #[error("[L001] Migration ledger unavailable: {0}")]
    StorageUnavailable(String),

    /// The migration id is already recorded (L002).
    #[error("[L002] Migration '{id}' is already recorded in the ledger")]
    DuplicateMigration { id: MigrationId },

    /// Reading or writing ledger rows failed (L003).
    #[error("[L003] Migration ledger query failed: {0}")]
    Query(String),
}

/// Result type alias for [`LedgerError`].
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Runner errors.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// No migration file carries the requested id (R001).
    #[error("[R001] Migration '{id}' cannot be found")]
    NotFound { id: MigrationId },

    /// More than one migration file carries the requested id (R002).
    #[error("[R002] Migration '{id}' matches more than one file: {files}")]
    AmbiguousMigration { id: MigrationId, files: String },

    /// The migration body failed; nothing was recorded (R003).
    #[error("[R003] Migration '{id}' ({name}) failed: {message}")]
    MigrationExecution {
        id: MigrationId,
        name: String,
        message: String,
    },

    /// Nothing in the registry can execute this migration (R004).
    #[error("[R004] No implementation registered for migration '{id}' ({name})")]
    Unresolved { id: MigrationId, name: String },

    /// The body succeeded but the ledger write did not (R005).
    #[error("[R005] Migration '{id}' was applied but could not be recorded: {source}")]
    RecordFailed {
        id: MigrationId,
        #[source]
        source: LedgerError,
    },

    /// `upgrade_all` stopped at the first failing migration (R006).
    #[error(
        "[R006] Upgrade halted at migration '{id}' after applying {} migration(s): {source}",
        .applied.len()
    )]
    UpgradeHalted {
        id: MigrationId,
        applied: Vec<MigrationId>,
        #[source]
        source: Box<RunnerError>,
    },

    /// Ledger failure outside of recording a migration.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Migration file discovery or loading failure.
    #[error(transparent)]
    Repository(#[from] CoreError),
}

impl RunnerError {
    /// Id of the migration this error is about, if it concerns one.
    ///
    /// For [`RunnerError::UpgradeHalted`] this is the migration that stopped
    /// the batch.
    pub fn migration_id(&self) -> Option<&MigrationId> {
        match self {
            RunnerError::NotFound { id }
            | RunnerError::AmbiguousMigration { id, .. }
            | RunnerError::MigrationExecution { id, .. }
            | RunnerError::Unresolved { id, .. }
            | RunnerError::RecordFailed { id, .. }
            | RunnerError::UpgradeHalted { id, .. } => Some(id),
            RunnerError::Ledger(LedgerError::DuplicateMigration { id }) => Some(id),
            RunnerError::Ledger(_) | RunnerError::Repository(_) => None,
        }
    }
}

/// Result type alias for [`RunnerError`].
pub type RunnerResult<T> = Result<T, RunnerError>;
