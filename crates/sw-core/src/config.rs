//! Configuration types and parsing for stepwise.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the connection used when none is requested.
pub const DEFAULT_CONNECTION: &str = "default";

/// Environment variable consulted when no `--connection` flag is given.
pub const CONNECTION_ENV_VAR: &str = "SW_CONNECTION";

/// Main project configuration from stepwise.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directory containing migration files, relative to the project root
    #[serde(default = "default_migration_path")]
    pub migration_path: String,

    /// Extension of migration files, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Ledger table settings
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Named database connections
    #[serde(default = "default_connections")]
    pub connections: HashMap<String, ConnectionConfig>,
}

/// Settings for the table that records applied migrations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Table name, without prefix
    #[serde(default = "default_ledger_table")]
    pub table: String,

    /// Table prefix; overrides the connection's prefix when set
    #[serde(default)]
    pub prefix: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            table: default_ledger_table(),
            prefix: None,
        }
    }
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Table prefix applied to the ledger table on this connection
    #[serde(default)]
    pub prefix: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
            prefix: String::new(),
        }
    }
}

impl ConnectionConfig {
    /// Returns `true` for an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }

    /// Resolve the database path against the project root.
    ///
    /// `:memory:` is returned unchanged.
    pub fn path_absolute(&self, root: &Path) -> String {
        if self.is_in_memory() {
            self.path.clone()
        } else {
            root.join(&self.path).display().to_string()
        }
    }
}

const IN_MEMORY_PATH: &str = ":memory:";

fn default_migration_path() -> String {
    "migrations".to_string()
}

fn default_extension() -> String {
    "sql".to_string()
}

fn default_ledger_table() -> String {
    "schema_migrations".to_string()
}

fn default_db_path() -> String {
    IN_MEMORY_PATH.to_string()
}

fn default_connections() -> HashMap<String, ConnectionConfig> {
    HashMap::from([(DEFAULT_CONNECTION.to_string(), ConnectionConfig::default())])
}

/// Returns `true` if `s` only contains characters safe to splice into a table name.
fn is_identifier(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for stepwise.yml or stepwise.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("stepwise.yml");
        let yaml_path = dir.join("stepwise.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |message: String| Err(CoreError::ConfigInvalid { message });

        if self.name.is_empty() {
            return invalid("Project name cannot be empty".to_string());
        }
        if self.migration_path.is_empty() {
            return invalid("migration_path cannot be empty".to_string());
        }
        if self.extension.is_empty() || self.extension.contains('.') {
            return invalid(format!(
                "extension '{}' must be non-empty and must not contain '.'",
                self.extension
            ));
        }
        if self.ledger.table.is_empty() || !is_identifier(&self.ledger.table) {
            return invalid(format!(
                "ledger.table '{}' must only contain letters, digits and '_'",
                self.ledger.table
            ));
        }
        if let Some(prefix) = &self.ledger.prefix {
            if !is_identifier(prefix) {
                return invalid(format!(
                    "ledger.prefix '{prefix}' must only contain letters, digits and '_'"
                ));
            }
        }
        if self.connections.is_empty() {
            return invalid("At least one connection must be configured".to_string());
        }
        for (name, connection) in &self.connections {
            if !is_identifier(&connection.prefix) {
                return invalid(format!(
                    "connections.{name}.prefix '{}' must only contain letters, digits and '_'",
                    connection.prefix
                ));
            }
        }

        Ok(())
    }

    /// Get the absolute migrations directory relative to a project root
    pub fn migration_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migration_path)
    }

    /// Sorted list of configured connection names
    pub fn available_connections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.connections.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get a connection by name
    pub fn connection(&self, name: &str) -> CoreResult<&ConnectionConfig> {
        self.connections
            .get(name)
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: format!(
                    "Connection '{}' not found. Available connections: {}",
                    name,
                    self.available_connections().join(", ")
                ),
            })
    }

    /// Fully-prefixed ledger table name for a connection.
    ///
    /// `ledger.prefix` wins over the connection's own prefix.
    pub fn ledger_table(&self, connection: &str) -> CoreResult<String> {
        let conn = self.connection(connection)?;
        let prefix = self.ledger.prefix.as_deref().unwrap_or(&conn.prefix);
        Ok(format!("{prefix}{}", self.ledger.table))
    }

    /// Resolve the connection name from CLI flag or SW_CONNECTION env var
    ///
    /// Priority: CLI flag > SW_CONNECTION env var > "default"
    pub fn resolve_connection(cli_connection: Option<&str>) -> String {
        cli_connection
            .map(String::from)
            .or_else(|| std::env::var(CONNECTION_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_CONNECTION.to_string())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
