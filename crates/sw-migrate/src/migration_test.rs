use super::*;
use std::path::PathBuf;
use sw_core::MigrationId;
use sw_db::DuckDbBackend;

struct CreateWidgets;

impl Migration for CreateWidgets {
    fn upgrade(&self, datasource: &dyn Datasource) -> Result<(), BoxError> {
        datasource.execute_batch("CREATE TABLE widgets (id INTEGER)")?;
        Ok(())
    }
}

fn record(name: &str, path: PathBuf) -> MigrationRecord {
    MigrationRecord {
        id: MigrationId::parse("20240101000000").unwrap(),
        name: name.to_string(),
        path,
    }
}

#[test]
fn test_sql_migration_upgrade_and_downgrade() {
    let db = DuckDbBackend::in_memory().unwrap();
    let migration = SqlMigration::from_sql(
        "-- upgrade\nCREATE TABLE users (id INTEGER);\n-- downgrade\nDROP TABLE users;\n",
    );

    migration.upgrade(&db).unwrap();
    assert!(db.relation_exists("users").unwrap());

    migration.downgrade(&db).unwrap();
    assert!(!db.relation_exists("users").unwrap());
}

#[test]
fn test_empty_sql_migration_is_noop() {
    let db = DuckDbBackend::in_memory().unwrap();
    let id = MigrationId::parse("20240101000000").unwrap();
    let migration = SqlMigration::from_sql(&template::render("Empty", &id));

    migration.upgrade(&db).unwrap();
    migration.downgrade(&db).unwrap();
}

#[test]
fn test_sql_migration_failure_surfaces_message() {
    let db = DuckDbBackend::in_memory().unwrap();
    let migration = SqlMigration::from_sql("-- upgrade\nSELECT * FROM does_not_exist;\n");
    let err = migration.upgrade(&db).unwrap_err();
    assert!(err.to_string().contains("does_not_exist"));
}

#[test]
fn test_sql_migration_without_upgrade_marker_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    for content in [
        "CREATE TABLE users (id INTEGER);",
        "--upgrade\nCREATE TABLE users (id INTEGER);\n",
    ] {
        let err = SqlMigration::from_sql(content).upgrade(&db).unwrap_err();
        assert!(err.to_string().contains("-- upgrade"), "got {err}");
    }
    assert!(!db.relation_exists("users").unwrap());
}

#[test]
fn test_sql_migration_keeps_comment_lines_in_body() {
    let db = DuckDbBackend::in_memory().unwrap();
    let migration = SqlMigration::from_sql(
        "-- upgrade\nCREATE TABLE notes (body VARCHAR);\n\
         INSERT INTO notes VALUES ('first\n-- second\nthird');\n",
    );
    migration.upgrade(&db).unwrap();

    let body = db.query_one("SELECT body FROM notes").unwrap().unwrap();
    assert_eq!(body, "first\n-- second\nthird");
}

#[test]
fn test_default_downgrade_is_noop() {
    let db = DuckDbBackend::in_memory().unwrap();
    CreateWidgets.downgrade(&db).unwrap();
}

#[test]
fn test_registry_prefers_registered_migration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("20240101000000-CreateWidgets.sql");
    std::fs::write(&path, "-- upgrade\nCREATE TABLE from_file (id INTEGER);\n").unwrap();

    let registry = MigrationRegistry::new().register("CreateWidgets", CreateWidgets);

    let db = DuckDbBackend::in_memory().unwrap();
    let migration = registry.resolve(&record("CreateWidgets", path)).unwrap();
    migration.upgrade(&db).unwrap();

    assert!(db.relation_exists("widgets").unwrap());
    assert!(!db.relation_exists("from_file").unwrap());
}

#[test]
fn test_registry_falls_back_to_sql_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("20240101000000-CreateOrders.sql");
    std::fs::write(&path, "-- upgrade\nCREATE TABLE orders (id INTEGER);\n").unwrap();

    let db = DuckDbBackend::in_memory().unwrap();
    let migration = MigrationRegistry::new()
        .resolve(&record("CreateOrders", path))
        .unwrap();
    migration.upgrade(&db).unwrap();
    assert!(db.relation_exists("orders").unwrap());
}

#[test]
fn test_registry_sql_fallback_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("20240101000000-Gone.sql");
    let err = MigrationRegistry::new()
        .resolve(&record("Gone", path))
        .err()
        .unwrap();
    assert!(matches!(err, RunnerError::Repository(_)), "got {err:?}");
}

#[test]
fn test_registered_only_registry_rejects_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("20240101000000-Unknown.sql");
    std::fs::write(&path, "-- upgrade\n").unwrap();

    let err = MigrationRegistry::registered_only()
        .resolve(&record("Unknown", path))
        .err()
        .unwrap();
    assert!(matches!(err, RunnerError::Unresolved { .. }), "got {err:?}");
}
