use super::*;
use tempfile::TempDir;

#[test]
fn parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: analytics\n").unwrap();
    assert_eq!(config.name, "analytics");
    assert_eq!(config.version, "1.0.0");
    assert_eq!(config.model_paths, vec!["models"]);
    assert_eq!(config.source_paths, vec!["sources"]);
    assert_eq!(config.target_path, "target");
    assert_eq!(config.materialization, Materialization::View);
    assert_eq!(config.database.path, ":memory:");
    assert!(config.schema.is_none());
}

#[test]
fn parse_full_config() {
    let yaml = r#"
name: warehouse
version: "2.1.0"
model_paths:
  - transforms
source_paths:
  - raw
target_path: out
materialization: table
schema: analytics
database:
  path: warehouse.duckdb
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.name, "warehouse");
    assert_eq!(config.model_paths, vec!["transforms"]);
    assert_eq!(config.materialization, Materialization::Table);
    assert_eq!(config.schema.as_deref(), Some("analytics"));
    assert_eq!(config.database.path, "warehouse.duckdb");
}

#[test]
fn unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: x\nnot_a_field: 1\n");
    assert!(result.is_err());
}

#[test]
fn load_missing_file() {
    let temp = TempDir::new().unwrap();
    let result = Config::load(&temp.path().join("strata.yml"));
    assert!(matches!(result, Err(CoreError::ConfigNotFound { .. })));
}

#[test]
fn load_invalid_yaml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("strata.yml");
    std::fs::write(&path, "name: [unclosed").unwrap();
    let result = Config::load(&path);
    assert!(matches!(result, Err(CoreError::ConfigParseError { .. })));
}

#[test]
fn paths_resolved_against_root() {
    let config: Config = serde_yaml::from_str("name: x\n").unwrap();
    let root = Path::new("/proj");
    assert_eq!(
        config.model_paths_absolute(root),
        vec![PathBuf::from("/proj/models")]
    );
    assert_eq!(
        config.source_paths_absolute(root),
        vec![PathBuf::from("/proj/sources")]
    );
}

#[test]
fn materialization_display() {
    assert_eq!(Materialization::View.to_string(), "view");
    assert_eq!(Materialization::Table.to_string(), "table");
    assert_eq!(Materialization::Incremental.to_string(), "incremental");
}
