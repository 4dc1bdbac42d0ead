//! Configuration validation
//!
//! Validates config consistency:
//! - Connection settings are present
//! - The column separator can be shared by staging files and load requests
//! - Filter ratio and timeout are in range
//! - Every table mapping is complete and unique
//! - Derived columns are well formed and do not shadow fields
//! - The counting record type is mapped

use std::collections::HashSet;

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::stream_load::StreamLoadConfig;
use crate::tables::TableConfig;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_stream_load(&config.stream_load)?;
    validate_tables(&config.tables)?;

    let counting = &config.stream_load.counting_type;
    if !config.tables.iter().any(|t| &t.record_type == counting) {
        return Err(ConfigError::UnmappedCountingType(counting.clone()));
    }

    Ok(())
}

/// Validate connection and request settings
fn validate_stream_load(config: &StreamLoadConfig) -> Result<()> {
    const COMPONENT: &str = "stream_load";
    let name = config.database.as_str();

    if config.url.trim().is_empty() {
        return Err(ConfigError::missing_field(COMPONENT, name, "url"));
    }
    if !(config.url.starts_with("http://") || config.url.starts_with("https://")) {
        return Err(ConfigError::invalid_value(
            COMPONENT,
            name,
            "url",
            format!("'{}' must start with http:// or https://", config.url),
        ));
    }
    if config.database.trim().is_empty() {
        return Err(ConfigError::missing_field(COMPONENT, name, "database"));
    }
    if config.user.is_empty() {
        return Err(ConfigError::missing_field(COMPONENT, name, "user"));
    }

    let sep = config.column_separator;
    if !sep.is_ascii() || matches!(sep, '\n' | '\r' | '"' | '\\') {
        return Err(ConfigError::invalid_value(
            COMPONENT,
            name,
            "column_separator",
            format!("{sep:?} must be a single ASCII character other than newline, quote or backslash"),
        ));
    }

    if !(0.0..=1.0).contains(&config.max_filter_ratio) {
        return Err(ConfigError::invalid_value(
            COMPONENT,
            name,
            "max_filter_ratio",
            format!("{} must be between 0.0 and 1.0", config.max_filter_ratio),
        ));
    }

    if config.timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            COMPONENT,
            name,
            "timeout",
            "must be greater than zero",
        ));
    }

    if config.counting_type.is_empty() {
        return Err(ConfigError::missing_field(COMPONENT, name, "counting_type"));
    }

    Ok(())
}

/// Validate table mappings
fn validate_tables(tables: &[TableConfig]) -> Result<()> {
    if tables.is_empty() {
        return Err(ConfigError::NoTables);
    }

    let mut types = HashSet::new();
    let mut names = HashSet::new();

    for table in tables {
        if table.record_type.is_empty() {
            return Err(ConfigError::missing_field("table", &table.table, "record_type"));
        }
        if table.table.is_empty() {
            return Err(ConfigError::missing_field("table", &table.record_type, "table"));
        }
        if !types.insert(table.record_type.as_str()) {
            return Err(ConfigError::duplicate("record type", &table.record_type));
        }
        if !names.insert(table.table.as_str()) {
            return Err(ConfigError::duplicate("table", &table.table));
        }
        validate_columns(table)?;
    }

    Ok(())
}

/// Validate the column list of one table
fn validate_columns(table: &TableConfig) -> Result<()> {
    if table.fields.is_empty() {
        return Err(ConfigError::missing_field("table", &table.table, "fields"));
    }

    let mut columns = HashSet::new();
    for field in &table.fields {
        if field.trim().is_empty() || field.contains([',', '=']) {
            return Err(ConfigError::invalid_value(
                "table",
                &table.table,
                "fields",
                format!("'{field}' is not a valid column name"),
            ));
        }
        if !columns.insert(field.as_str()) {
            return Err(ConfigError::invalid_value(
                "table",
                &table.table,
                "fields",
                format!("'{field}' is listed more than once"),
            ));
        }
    }

    for expression in &table.derived {
        let Some(name) = TableConfig::derived_name(expression) else {
            return Err(ConfigError::invalid_value(
                "table",
                &table.table,
                "derived",
                format!("'{expression}' must have the form name=expression"),
            ));
        };
        if !columns.insert(name) {
            return Err(ConfigError::invalid_value(
                "table",
                &table.table,
                "derived",
                format!("'{name}' clashes with another column"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;
