//! Migration file repository.
//!
//! [`MigrationRepository`] owns the translation from a migrations directory to
//! ordered [`MigrationRecord`]s, and writes new migration files from the
//! template.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::migration::{file_name_for, validate_name, MigrationRecord};
use crate::migration_id::MigrationId;
use crate::template;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory of migration files sharing one extension.
#[derive(Debug, Clone)]
pub struct MigrationRepository {
    dir: PathBuf,
    extension: String,
}

impl MigrationRepository {
    /// Create a repository over `dir` for files ending in `.{extension}`.
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Create a repository from project configuration rooted at `root`.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self::new(config.migration_path_absolute(root), config.extension.clone())
    }

    /// The migrations directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The migration file extension, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// List every migration file, ordered ascending by id.
    ///
    /// Entries that do not match the migration file pattern are skipped.
    /// Records sharing an id are ordered by name so the result does not depend
    /// on directory enumeration order. A missing directory yields no records.
    pub fn list_migrations(&self) -> CoreResult<Vec<MigrationRecord>> {
        if !self.dir.exists() {
            log::debug!(
                "Migrations directory {} does not exist",
                self.dir.display()
            );
            return Ok(Vec::new());
        }

        let io_err = |e| CoreError::IoWithPath {
            path: self.dir.display().to_string(),
            source: e,
        };

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            match MigrationRecord::from_path(&path, &self.extension) {
                Some(record) => records.push(record),
                None => log::debug!("Skipping non-migration file {}", path.display()),
            }
        }

        records.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));
        Ok(records)
    }

    /// All records whose id equals `id`.
    pub fn find_by_id(&self, id: &MigrationId) -> CoreResult<Vec<MigrationRecord>> {
        Ok(self
            .list_migrations()?
            .into_iter()
            .filter(|r| &r.id == id)
            .collect())
    }

    /// The first record (by id) using `name`, if any.
    pub fn find_by_name(&self, name: &str) -> CoreResult<Option<MigrationRecord>> {
        Ok(self.list_migrations()?.into_iter().find(|r| r.name == name))
    }

    /// Fail with [`CoreError::DuplicateName`] if any migration already uses `name`.
    pub fn ensure_name_available(&self, name: &str) -> CoreResult<()> {
        match self.find_by_name(name)? {
            Some(existing) => Err(CoreError::DuplicateName {
                name: name.to_string(),
                path: existing.path.display().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Write a new migration file named `<id>-<name>.<ext>` from the template.
    ///
    /// All checks run before anything touches the filesystem. The file is
    /// opened with create-new semantics, so an existing path is a
    /// [`CoreError::WriteError`] rather than an overwrite.
    pub fn create(&self, name: &str, id: MigrationId) -> CoreResult<MigrationRecord> {
        validate_name(name)?;
        self.ensure_name_available(name)?;

        if let Some(clash) = self.find_by_id(&id)?.into_iter().next() {
            return Err(CoreError::DuplicateId {
                id: id.to_string(),
                path: clash.path.display().to_string(),
            });
        }

        let path = self.dir.join(file_name_for(&id, name, &self.extension));
        let write_err = |source| CoreError::WriteError {
            path: path.display().to_string(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(write_err)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(write_err)?;
        file.write_all(template::render(name, &id).as_bytes())
            .map_err(write_err)?;

        log::debug!("Created migration file {}", path.display());
        Ok(MigrationRecord {
            id,
            name: name.to_string(),
            path,
        })
    }
}

#[cfg(test)]
#[path = "repository_test.rs"]
mod tests;
