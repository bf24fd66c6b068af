//! Migration file template and section parsing.
//!
//! A migration file holds two sections introduced by marker lines:
//!
//! ```sql
//! -- upgrade
//! CREATE TABLE users (id INTEGER);
//!
//! -- downgrade
//! DROP TABLE users;
//! ```
//!
//! Anything before the first marker is header text. Section bodies are kept
//! verbatim apart from surrounding blank lines; comments inside them are left
//! for the database to handle.

use crate::migration_id::MigrationId;

/// Marker line that opens the upgrade section.
pub const UPGRADE_MARKER: &str = "-- upgrade";

/// Marker line that opens the downgrade section.
pub const DOWNGRADE_MARKER: &str = "-- downgrade";

/// Render the body of a freshly created migration file.
///
/// Both sections hold only comments, so running the file untouched is a no-op.
pub fn render(name: &str, id: &MigrationId) -> String {
    format!(
        "-- Migration: {name}\n\
         -- ID: {id}\n\
         \n\
         {UPGRADE_MARKER}\n\
         -- Statements that apply this migration.\n\
         \n\
         \n\
         {DOWNGRADE_MARKER}\n\
         -- Statements that undo this migration.\n\
         \n"
    )
}

/// The executable sections of a migration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSections {
    /// Whether an upgrade marker line was found
    pub has_upgrade: bool,

    /// SQL run when the migration is applied
    pub upgrade: String,

    /// SQL that undoes the migration (never run by the runner)
    pub downgrade: String,
}

/// `true` if `sql` has a line that is neither blank nor a `--` comment.
pub fn has_statements(sql: &str) -> bool {
    sql.lines().any(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with("--")
    })
}

#[derive(Clone, Copy)]
enum Section {
    Header,
    Upgrade,
    Downgrade,
}

/// Split migration file content into its upgrade and downgrade bodies.
pub fn split_sections(content: &str) -> MigrationSections {
    let mut upgrade = Vec::new();
    let mut downgrade = Vec::new();
    let mut current = Section::Header;
    let mut has_upgrade = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case(UPGRADE_MARKER) {
            current = Section::Upgrade;
            has_upgrade = true;
            continue;
        }
        if trimmed.eq_ignore_ascii_case(DOWNGRADE_MARKER) {
            current = Section::Downgrade;
            continue;
        }
        match current {
            Section::Header => {}
            Section::Upgrade => upgrade.push(line),
            Section::Downgrade => downgrade.push(line),
        }
    }

    MigrationSections {
        has_upgrade,
        upgrade: upgrade.join("\n").trim().to_string(),
        downgrade: downgrade.join("\n").trim().to_string(),
    }
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
