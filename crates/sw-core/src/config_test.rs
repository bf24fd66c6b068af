use super::*;
use tempfile::TempDir;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: test_project").unwrap();
    assert_eq!(config.name, "test_project");
    assert_eq!(config.extension, "sql");
    assert_eq!(config.ledger.table, "schema_migrations");
    assert_eq!(config.available_connections(), vec!["default"]);

    let root = PathBuf::from("/tmp/test");
    assert_eq!(
        config.migration_path_absolute(&root),
        root.join("migrations")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: shop
migration_path: db/migrations
extension: sql
ledger:
  table: applied_migrations
connections:
  default:
    type: duckdb
    path: "./shop.duckdb"
    prefix: app_
  reporting:
    path: ":memory:"
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.available_connections(), vec!["default", "reporting"]);

    let default = config.connection("default").unwrap();
    assert_eq!(default.db_type, DbType::DuckDb);
    assert!(!default.is_in_memory());
    assert!(config.connection("reporting").unwrap().is_in_memory());

    assert_eq!(
        config.ledger_table("default").unwrap(),
        "app_applied_migrations"
    );
    assert_eq!(
        config.ledger_table("reporting").unwrap(),
        "applied_migrations"
    );
}

#[test]
fn test_ledger_prefix_overrides_connection_prefix() {
    let yaml = r#"
name: shop
ledger:
  prefix: meta_
connections:
  default:
    prefix: app_
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        config.ledger_table("default").unwrap(),
        "meta_schema_migrations"
    );
}

#[test]
fn test_unknown_connection_lists_available() {
    let config: Config = serde_yaml::from_str("name: shop").unwrap();
    let err = config.connection("prod").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("prod"));
    assert!(msg.contains("default"));
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: shop\nmodel_paths: [models]");
    assert!(result.is_err());
}

#[test]
fn test_validate_rejects_bad_values() {
    let cases = [
        "name: ''",
        "name: shop\nextension: ''",
        "name: shop\nextension: up.sql",
        "name: shop\nledger:\n  table: 'drop table;'",
        "name: shop\nledger:\n  prefix: 'a.b'",
        "name: shop\nconnections: {}",
        "name: shop\nconnections:\n  default:\n    prefix: 'x y'",
    ];
    for yaml in cases {
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, CoreError::ConfigInvalid { .. }),
            "expected ConfigInvalid for {yaml:?}"
        );
    }
}

#[test]
fn test_path_absolute() {
    let root = Path::new("/srv/app");
    let file = ConnectionConfig {
        path: "data/app.duckdb".to_string(),
        ..Default::default()
    };
    assert_eq!(file.path_absolute(root), "/srv/app/data/app.duckdb");
    assert_eq!(ConnectionConfig::default().path_absolute(root), ":memory:");
}

#[test]
fn test_load_from_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("stepwise.yaml"), "name: from_yaml\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_yaml");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_runs_validation() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("stepwise.yml"), "name: shop\nextension: ''\n").unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

// These tests modify environment variables and must run serially
use serial_test::serial;

#[test]
#[serial]
fn test_resolve_connection_cli_takes_precedence() {
    let original = std::env::var(CONNECTION_ENV_VAR).ok();
    std::env::set_var(CONNECTION_ENV_VAR, "staging");
    assert_eq!(Config::resolve_connection(Some("prod")), "prod");
    match original {
        Some(v) => std::env::set_var(CONNECTION_ENV_VAR, v),
        None => std::env::remove_var(CONNECTION_ENV_VAR),
    }
}

#[test]
#[serial]
fn test_resolve_connection_uses_env_var() {
    let original = std::env::var(CONNECTION_ENV_VAR).ok();
    std::env::set_var(CONNECTION_ENV_VAR, "staging");
    assert_eq!(Config::resolve_connection(None), "staging");
    match original {
        Some(v) => std::env::set_var(CONNECTION_ENV_VAR, v),
        None => std::env::remove_var(CONNECTION_ENV_VAR),
    }
}

#[test]
#[serial]
fn test_resolve_connection_falls_back_to_default() {
    let original = std::env::var(CONNECTION_ENV_VAR).ok();
    std::env::remove_var(CONNECTION_ENV_VAR);
    assert_eq!(Config::resolve_connection(None), DEFAULT_CONNECTION);
    if let Some(v) = original {
        std::env::set_var(CONNECTION_ENV_VAR, v);
    }
}
