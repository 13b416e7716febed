use mirror_fs::{ConfigStore, Error};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
struct TestConfig {
    name: String,
    count: i32,
}

#[test]
fn test_load_toml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "name = \"test\"\ncount = 42").unwrap();

    let config: TestConfig = ConfigStore::new().load(&path).unwrap();

    assert_eq!(
        config,
        TestConfig {
            name: "test".into(),
            count: 42
        }
    );
}

#[test]
fn test_load_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    fs::write(&path, r#"{"name": "test", "count": 42}"#).unwrap();

    let config: TestConfig = ConfigStore::new().load(&path).unwrap();

    assert_eq!(config.count, 42);
}

#[test]
fn test_load_or_default_missing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");

    let config: TestConfig = ConfigStore::new().load_or_default(&path).unwrap();

    assert_eq!(config, TestConfig::default());
}

#[test]
fn test_load_malformed_toml_reports_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "name = ").unwrap();

    let result: Result<TestConfig, _> = ConfigStore::new().load(&path);

    assert!(matches!(result, Err(Error::ConfigParse { .. })));
}

#[rstest]
#[case("config.toml", "count = 7")]
#[case("config.json", "\"count\": 7")]
fn test_save_then_file_contains(#[case] file_name: &str, #[case] expected: &str) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(file_name);

    let config = TestConfig {
        name: "mirror".into(),
        count: 7,
    };
    ConfigStore::new().save(&path, &config).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains(expected), "got: {content}");
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.ini");
    fs::write(&path, "name=x").unwrap();

    let result: Result<TestConfig, _> = ConfigStore::new().load(&path);

    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
}
