//! Migration runner.
//!
//! [`MigrationRunner`] decides which migrations run and in what order. It
//! never runs two migrations at once and never applies a migration older than
//! the latest one in the ledger during [`MigrationRunner::upgrade_all`].

use crate::error::{RunnerError, RunnerResult};
use crate::ledger::MigrationLedger;
use crate::migration::MigrationRegistry;
use chrono::{NaiveDateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use sw_core::{MigrationId, MigrationRecord, MigrationRepository};
use sw_db::Datasource;

/// Result of [`MigrationRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The migration body ran and the ledger recorded it.
    Applied(MigrationRecord),
    /// The ledger already had this id; nothing ran.
    AlreadyApplied(MigrationId),
}

/// Result of a successful [`MigrationRunner::upgrade_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeReport {
    /// Latest applied id before the upgrade started
    pub previous_latest: Option<MigrationId>,

    /// Migrations applied by this upgrade, in order
    pub applied: Vec<MigrationRecord>,
}

impl UpgradeReport {
    /// `true` when there was nothing to apply.
    pub fn is_up_to_date(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Ledger state of a discovered migration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// Recorded in the ledger
    Applied,
    /// Newer than the latest applied id; `upgrade_all` will run it
    Pending,
    /// Older than the latest applied id but never applied; `upgrade_all`
    /// will not run it, `run` can
    Skipped,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Applied => write!(f, "applied"),
            MigrationState::Pending => write!(f, "pending"),
            MigrationState::Skipped => write!(f, "skipped"),
        }
    }
}

/// A migration file together with its ledger state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// The migration file
    pub record: MigrationRecord,
    /// Its state
    pub state: MigrationState,
    /// When it was applied, for applied migrations with a timestamp
    pub applied_at: Option<NaiveDateTime>,
}

/// Orchestrates discovery, ledger checks, execution, and recording.
pub struct MigrationRunner<'a> {
    datasource: &'a dyn Datasource,
    repository: MigrationRepository,
    ledger: MigrationLedger<'a>,
    registry: MigrationRegistry,
}

impl<'a> MigrationRunner<'a> {
    /// Build a runner from its collaborators.
    ///
    /// The ledger is expected to be installed already (see
    /// [`MigrationLedger::ensure_installed`]).
    pub fn new(
        datasource: &'a dyn Datasource,
        repository: MigrationRepository,
        ledger: MigrationLedger<'a>,
        registry: MigrationRegistry,
    ) -> Self {
        Self {
            datasource,
            repository,
            ledger,
            registry,
        }
    }

    /// The migration file repository.
    pub fn repository(&self) -> &MigrationRepository {
        &self.repository
    }

    /// The ledger.
    pub fn ledger(&self) -> &MigrationLedger<'a> {
        &self.ledger
    }

    /// Create a new migration file with an id for the current UTC second.
    pub fn create(&self, name: &str) -> RunnerResult<MigrationRecord> {
        Ok(self.repository.create(name, MigrationId::now())?)
    }

    /// Apply exactly one migration.
    ///
    /// A migration already in the ledger is reported as
    /// [`RunOutcome::AlreadyApplied`] without touching its body. If the body
    /// fails nothing is recorded, so the migration stays pending.
    pub fn run(&self, id: &MigrationId) -> RunnerResult<RunOutcome> {
        if self.ledger.is_applied(id)? {
            log::info!("Migration {id} has already been applied");
            return Ok(RunOutcome::AlreadyApplied(id.clone()));
        }

        let record = self.locate(id)?;
        let migration = self.registry.resolve(&record)?;

        log::info!("Applying migration {}", record.file_name());
        migration
            .upgrade(self.datasource)
            .map_err(|e| RunnerError::MigrationExecution {
                id: id.clone(),
                name: record.name.clone(),
                message: e.to_string(),
            })?;

        self.ledger
            .record_applied(id, Utc::now().naive_utc())
            .map_err(|source| RunnerError::RecordFailed {
                id: id.clone(),
                source,
            })?;

        log::debug!("Migration {id} recorded in {}", self.ledger.table());
        Ok(RunOutcome::Applied(record))
    }

    /// Apply every migration newer than the latest applied one, oldest first.
    ///
    /// Stops at the first failure; later migrations are not attempted.
    pub fn upgrade_all(&self) -> RunnerResult<UpgradeReport> {
        let previous_latest = self.ledger.latest_applied_id()?;
        let mut pending_ids: Vec<MigrationId> =
            self.pending_after(previous_latest.as_ref())?
                .into_iter()
                .map(|r| r.id)
                .collect();
        pending_ids.dedup();

        log::debug!(
            "{} pending migration(s) after {}",
            pending_ids.len(),
            previous_latest.as_ref().map_or("<none>", |id| id.as_str())
        );

        let mut applied = Vec::new();
        for id in pending_ids {
            match self.run(&id) {
                Ok(RunOutcome::Applied(record)) => applied.push(record),
                Ok(RunOutcome::AlreadyApplied(_)) => {}
                Err(source) => {
                    return Err(RunnerError::UpgradeHalted {
                        id,
                        applied: applied.into_iter().map(|r| r.id).collect(),
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(UpgradeReport {
            previous_latest,
            applied,
        })
    }

    /// Migrations [`upgrade_all`](Self::upgrade_all) would attempt, in order.
    pub fn pending(&self) -> RunnerResult<Vec<MigrationRecord>> {
        let latest = self.ledger.latest_applied_id()?;
        self.pending_after(latest.as_ref())
    }

    /// Every discovered migration with its ledger state.
    pub fn status(&self) -> RunnerResult<Vec<MigrationStatus>> {
        let latest = self.ledger.latest_applied_id()?;
        let applied: HashMap<MigrationId, Option<NaiveDateTime>> = self
            .ledger
            .entries()?
            .into_iter()
            .map(|e| (e.migration_id, e.applied_at))
            .collect();

        Ok(self
            .repository
            .list_migrations()?
            .into_iter()
            .map(|record| {
                let (state, applied_at) = match applied.get(&record.id) {
                    Some(at) => (MigrationState::Applied, *at),
                    None if latest.as_ref().is_some_and(|l| &record.id <= l) => {
                        (MigrationState::Skipped, None)
                    }
                    None => (MigrationState::Pending, None),
                };
                MigrationStatus {
                    record,
                    state,
                    applied_at,
                }
            })
            .collect())
    }

    fn pending_after(&self, latest: Option<&MigrationId>) -> RunnerResult<Vec<MigrationRecord>> {
        Ok(self
            .repository
            .list_migrations()?
            .into_iter()
            .filter(|r| latest.map_or(true, |l| &r.id > l))
            .collect())
    }

    fn locate(&self, id: &MigrationId) -> RunnerResult<MigrationRecord> {
        let mut matches = self.repository.find_by_id(id)?;
        match matches.len() {
            0 => Err(RunnerError::NotFound { id: id.clone() }),
            1 => Ok(matches.remove(0)),
            _ => Err(RunnerError::AmbiguousMigration {
                id: id.clone(),
                files: matches
                    .iter()
                    .map(|r| r.file_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
