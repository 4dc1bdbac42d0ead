//! Tests for configuration validation

use std::time::Duration;

use crate::error::ConfigError;
use crate::tables::TableConfig;
use crate::{Config, UnmappedTypePolicy};

use super::validate_config;

fn config_with_tables(tables: Vec<TableConfig>) -> Config {
    Config {
        tables,
        ..Config::default()
    }
}

#[test]
fn test_default_config_is_valid() {
    assert!(validate_config(&Config::default()).is_ok());
}

#[test]
fn test_skip_policy_is_valid() {
    let mut config = Config::default();
    config.stream_load.unmapped_types = UnmappedTypePolicy::Skip;
    assert!(validate_config(&config).is_ok());
}

// =============================================================================
// Stream load settings
// =============================================================================

#[test]
fn test_empty_url_rejected() {
    let mut config = Config::default();
    config.stream_load.url = String::new();
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "url", .. }));
}

#[test]
fn test_url_without_scheme_rejected() {
    let mut config = Config::default();
    config.stream_load.url = "fe.internal:8030".into();
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "url", .. }));
}

#[test]
fn test_empty_database_rejected() {
    let mut config = Config::default();
    config.stream_load.database = String::new();
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingField {
            field: "database",
            ..
        }
    ));
}

#[test]
fn test_separator_rules() {
    for bad in ['\n', '\r', '"', '\\', 'é'] {
        let mut config = Config::default();
        config.stream_load.column_separator = bad;
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(
                err,
                ConfigError::InvalidValue {
                    field: "column_separator",
                    ..
                }
            ),
            "separator {bad:?} should be rejected"
        );
    }

    for good in [',', '\t', '|', '\x01'] {
        let mut config = Config::default();
        config.stream_load.column_separator = good;
        assert!(validate_config(&config).is_ok(), "separator {good:?} should pass");
    }
}

#[test]
fn test_filter_ratio_bounds() {
    for (ratio, ok) in [(0.0, true), (1.0, true), (0.5, true), (-0.1, false), (1.01, false), (f64::NAN, false)] {
        let mut config = Config::default();
        config.stream_load.max_filter_ratio = ratio;
        assert_eq!(validate_config(&config).is_ok(), ok, "ratio {ratio}");
    }
}

#[test]
fn test_zero_timeout_rejected() {
    let mut config = Config::default();
    config.stream_load.timeout = Duration::ZERO;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "timeout", .. }));
}

#[test]
fn test_unmapped_counting_type_rejected() {
    let mut config = Config::default();
    config.stream_load.counting_type = "header".into();
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::UnmappedCountingType(t) if t == "header"));
}

// =============================================================================
// Table mappings
// =============================================================================

#[test]
fn test_no_tables_rejected() {
    let err = validate_config(&config_with_tables(Vec::new())).unwrap_err();
    assert!(matches!(err, ConfigError::NoTables));
}

#[test]
fn test_duplicate_record_type_rejected() {
    let err = validate_config(&config_with_tables(vec![
        TableConfig::new("block", "blocks", ["number"]),
        TableConfig::new("block", "blocks_copy", ["number"]),
    ]))
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::DuplicateMapping {
            what: "record type",
            ..
        }
    ));
}

#[test]
fn test_duplicate_table_rejected() {
    let err = validate_config(&config_with_tables(vec![
        TableConfig::new("block", "blocks", ["number"]),
        TableConfig::new("uncle", "blocks", ["number"]),
    ]))
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateMapping { what: "table", .. }));
}

#[test]
fn test_empty_fields_rejected() {
    let err = validate_config(&config_with_tables(vec![TableConfig::new(
        "block",
        "blocks",
        Vec::<String>::new(),
    )]))
    .unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "fields", .. }));
}

#[test]
fn test_duplicate_field_rejected() {
    let err = validate_config(&config_with_tables(vec![TableConfig::new(
        "block",
        "blocks",
        ["number", "hash", "number"],
    )]))
    .unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn test_field_with_comma_rejected() {
    let err = validate_config(&config_with_tables(vec![TableConfig::new(
        "block",
        "blocks",
        ["number,hash"],
    )]))
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "fields", .. }));
}

#[test]
fn test_malformed_derived_rejected() {
    let table = TableConfig::new("block", "blocks", ["number"]).with_derived("block_time");
    let err = validate_config(&config_with_tables(vec![table])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "derived", .. }));
}

#[test]
fn test_derived_shadowing_field_rejected() {
    let table = TableConfig::new("block", "blocks", ["number", "block_time"])
        .with_derived("block_time=from_unixtime(number)");
    let err = validate_config(&config_with_tables(vec![table])).unwrap_err();
    assert!(err.to_string().contains("clashes"));
}
