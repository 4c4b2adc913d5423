use rustf_sql::prelude::*;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_from_file_configures_dialect() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "sql.toml",
        r#"
parameterized = false

[dialects.sqlite]
timestamp_format = "%Y/%m/%d"
"#,
    );

    let config = CompilerConfig::from_file(&path).unwrap();
    let dialect = SqlDialect::with_config(DatabaseBackend::SQLite, &config).unwrap();
    assert!(!dialect.parameterized());

    let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let statement = QueryBuilder::new(&dialect)
        .from("events")
        .filter(Expression::gte("day", date))
        .build()
        .unwrap();
    assert_eq!(
        statement.sql,
        "SELECT * FROM \"events\" WHERE (\"day\" >= '2024/01/31')"
    );
    assert!(statement.params.is_empty());
}

#[test]
fn test_layered_overlay_wins() {
    let dir = TempDir::new().unwrap();
    let base = write(
        &dir,
        "base.toml",
        r#"
strict_predicates = false

[dialects.mysql]
max_statement_length = 4096
timestamp_format = "%Y-%m-%d %H:%M:%S"
"#,
    );
    let overlay = write(
        &dir,
        "production.toml",
        r#"
strict_predicates = true

[dialects.mysql]
max_statement_length = 64
"#,
    );

    let config = CompilerConfig::load_layered(&base, &overlay).unwrap();
    assert!(config.strict_predicates);

    let mysql = config.dialect(DatabaseBackend::MySQL).unwrap();
    assert_eq!(mysql.max_statement_length, Some(64));
    assert_eq!(mysql.timestamp_format.as_deref(), Some("%Y-%m-%d %H:%M:%S"));

    let dialect = SqlDialect::with_config(DatabaseBackend::MySQL, &config).unwrap();
    let long_filter = Expression::is_in("id", 0..100);
    let err = QueryBuilder::new(&dialect)
        .from("t")
        .filter(long_filter)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::MaxLengthExceeded { max: 64, .. }));
}

#[test]
fn test_missing_overlay_falls_back_to_base() {
    let dir = TempDir::new().unwrap();
    let base = write(&dir, "base.toml", "parameterized = true\n");

    let config = CompilerConfig::load_layered(&base, dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, CompilerConfig::default());
}

#[test]
fn test_invalid_file_reports_context() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.toml", "[dialects.sqlserver]\nmax_statement_length = 0\n");

    let err = CompilerConfig::from_file(&path).unwrap_err();
    assert_eq!(err.error_code(), "E_CONFIG");
    assert!(err.to_string().contains("bad.toml"));

    let missing = CompilerConfig::from_file(dir.path().join("nope.toml"));
    assert!(missing.is_err());
}
