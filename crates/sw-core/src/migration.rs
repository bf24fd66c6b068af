//! Migration records discovered from the filesystem.

use crate::error::{CoreError, CoreResult};
use crate::migration_id::MigrationId;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A migration file parsed from `<14-digit-id>-<name>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    /// Timestamp id taken from the file name
    pub id: MigrationId,

    /// Migration name (the part between the `-` and the extension)
    pub name: String,

    /// Full path to the migration file
    pub path: PathBuf,
}

impl MigrationRecord {
    /// Build a record from a path if its file name matches the migration pattern.
    ///
    /// Returns `None` for anything that is not a migration file.
    pub fn from_path(path: &Path, extension: &str) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let (id, name) = parse_file_name(file_name, extension)?;
        Some(Self {
            id,
            name: name.to_string(),
            path: path.to_path_buf(),
        })
    }

    /// File name component of the record's path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Split a migration file name into its id and name.
///
/// The accepted shape is exactly 14 ASCII digits, a `-`, a non-empty name
/// without any `.`, then `.` and `extension`.
pub fn parse_file_name<'a>(file_name: &'a str, extension: &str) -> Option<(MigrationId, &'a str)> {
    let stem = file_name
        .strip_suffix(extension)?
        .strip_suffix('.')?;

    if stem.len() <= MigrationId::LEN + 1 || !stem.is_char_boundary(MigrationId::LEN) {
        return None;
    }
    let (digits, rest) = stem.split_at(MigrationId::LEN);
    let name = rest.strip_prefix('-')?;
    if name.is_empty() || name.contains('.') {
        return None;
    }
    let id = MigrationId::try_new(digits)?;
    Some((id, name))
}

/// Build the file name a migration with `id` and `name` is stored under.
pub fn file_name_for(id: &MigrationId, name: &str, extension: &str) -> String {
    format!("{id}-{name}.{extension}")
}

/// Check that `name` can be embedded in a migration file name.
///
/// Names are restricted to ASCII letters, digits, `_` and `-` so the file
/// round-trips through [`parse_file_name`] on every platform.
pub fn validate_name(name: &str) -> CoreResult<()> {
    let invalid = |reason: &str| CoreError::InvalidMigrationName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(invalid(&format!(
            "character '{c}' is not allowed (use letters, digits, '_' or '-')"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
