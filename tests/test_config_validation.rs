//! Configuration loading against the fixture files.

mod common;

use std::collections::HashMap;

use common::fixture_path;
use flashreveal::config::loader::{apply_env_overrides, parse_yaml};
use flashreveal::config::{ConfigLoader, ConfigOverrides, LoaderOptions, RevealConfig};
use flashreveal::error::{ConfigError, Severity};
use flashreveal::reveal::RevealMachine;

fn loader() -> ConfigLoader {
    ConfigLoader::new(LoaderOptions {
        ignore_env: true,
        ..LoaderOptions::default()
    })
}

#[test]
fn spelled_out_defaults_equal_builtin_defaults() {
    let loaded = loader().load(&fixture_path("valid.yaml")).unwrap();
    assert_eq!(*loaded.config, RevealConfig::default());
    assert!(loaded.warnings.is_empty());
}

#[test]
fn invalid_fixture_reports_every_issue() {
    let err = loader().load(&fixture_path("invalid.yaml")).unwrap_err();
    let ConfigError::ValidationError { source_name, errors } = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(source_name.ends_with("invalid.yaml"));

    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert!(paths.contains(&"flash_interval_ms"));
    assert!(paths.contains(&"flash_count_range"));
    assert!(paths.contains(&"particle_bounds.size"));
    assert!(paths.contains(&"color_palette[1]"));
    assert!(errors.iter().all(|e| e.severity == Severity::Error));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = loader().load(&fixture_path("malformed.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }), "{err:?}");
}

#[test]
fn missing_file() {
    let err = loader().load(&fixture_path("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingFile { .. }));
}

#[test]
fn identical_labels_warn_only() {
    let loaded = loader().load(&fixture_path("same_labels.yaml")).unwrap();
    assert_eq!(loaded.warnings.len(), 1);
    assert_eq!(loaded.warnings[0].path, "labels");
    assert_eq!(loaded.warnings[0].severity, Severity::Warning);
}

#[test]
fn cli_overrides_win_over_file() {
    let loader = ConfigLoader::new(LoaderOptions {
        ignore_env: true,
        overrides: ConfigOverrides {
            flash_interval_ms: Some(40),
            particle_count: Some(3),
        },
        ..LoaderOptions::default()
    });
    let loaded = loader.load(&fixture_path("fast.yaml")).unwrap();
    assert_eq!(loaded.config.flash_interval_ms, 40);
    assert_eq!(loaded.config.particle_count, 3);
    assert_eq!(loaded.config.flash_count_range.min, 3);
}

#[test]
fn env_overrides_apply_before_validation() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("FLASHREVEAL_FLASH_INTERVAL_MS", "60"),
        ("FLASHREVEAL_FLASH_COUNT_MIN", "2"),
        ("FLASHREVEAL_FLASH_COUNT_MAX_EXCLUSIVE", "4"),
    ]);
    let mut config = parse_yaml("", std::path::Path::new("<test>")).unwrap();
    apply_env_overrides(&mut config, |k| env.get(k).map(ToString::to_string)).unwrap();
    assert_eq!(config.flash_interval_ms, 60);
    assert_eq!(config.flash_count_range.min, 2);
    assert_eq!(config.flash_count_range.max_exclusive, 4);
}

#[test]
fn bad_env_override_is_invalid_value() {
    let mut config = RevealConfig::default();
    let err = apply_env_overrides(&mut config, |k| {
        (k == "FLASHREVEAL_PARTICLE_COUNT").then(|| "lots".to_string())
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }), "{err:?}");
}

#[test]
fn machine_rejects_invalid_config() {
    let config = RevealConfig {
        particle_count: 0,
        ..RevealConfig::default()
    };
    assert!(matches!(
        RevealMachine::with_entropy(&config),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn loaded_config_drives_machine() {
    let loaded = loader().load(&fixture_path("fast.yaml")).unwrap();
    let machine = RevealMachine::with_entropy(&loaded.config).unwrap();
    assert_eq!(machine.particle_count(), 6);
}
