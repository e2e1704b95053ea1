//! Integration tests for configuration loading and overrides.

use std::path::Path;
use std::time::Duration;

use carbon_regulator::config::{ENV_INTERVAL, RegulatorConfig};

const EXAMPLE: &str = include_str!("../regulator.example.toml");

#[test]
fn example_config_is_valid() {
    let cfg = RegulatorConfig::from_toml_str(EXAMPLE).expect("example config should parse");
    let errors = cfg.validate();
    assert!(errors.is_empty(), "example should be valid: {errors:?}");
    assert_eq!(cfg.interval(), Some(Duration::from_secs(1800)));
    let ids: Vec<&str> = cfg.assets.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["battery-a", "battery-b"]);
}

#[test]
fn missing_file_is_a_config_error() {
    let err = RegulatorConfig::from_toml_file(Path::new("does/not/exist.toml"))
        .expect_err("missing file should fail");
    assert_eq!(err.field, "config");
    assert!(err.message.contains("cannot read"));
}

#[test]
fn env_interval_satisfies_national_grid_preset() {
    let mut cfg = RegulatorConfig::from_preset("national_grid").expect("preset exists");
    assert!(!cfg.validate().is_empty());

    cfg.apply_env(|key| (key == ENV_INTERVAL).then(|| "900".to_string()))
        .expect("numeric override");
    assert!(cfg.validate().is_empty());
    assert_eq!(cfg.interval(), Some(Duration::from_secs(900)));
}

#[test]
fn every_validation_error_is_reported() {
    let toml = r#"
[regulation]
interval_secs = 0

[source]
kind = "national_grid"
base_url = ""
timeout_secs = 0
"#;
    let cfg = RegulatorConfig::from_toml_str(toml).expect("shape is valid");
    let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
    for expected in [
        "regulation.interval_secs",
        "source.base_url",
        "source.timeout_secs",
        "assets",
    ] {
        assert!(
            fields.iter().any(|f| f == expected),
            "missing {expected} in {fields:?}"
        );
    }
}
