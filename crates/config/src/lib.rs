//! Chainload Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid config: it loads blocks and transactions into
//! `eth.blocks` and `eth.transactions` on a local front end.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use chainload_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[stream_load]\ndatabase = \"eth\"").unwrap();
//! assert_eq!(config.tables.len(), 2);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [stream_load]
//! url = "http://10.148.0.2:8030"
//! database = "eth"
//! user = "root"
//! password = "secret"
//! staging_dir = "/var/lib/chainload"
//!
//! [[tables]]
//! record_type = "block"
//! table = "blocks"
//! fields = ["number", "hash", "block_timestamp"]
//! derived = ["block_time=from_unixtime(block_timestamp-28800)"]
//! ```

mod error;
mod logging;
mod stream_load;
mod tables;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use stream_load::{
    DEFAULT_COLUMN_SEPARATOR, DEFAULT_COUNTING_TYPE, DEFAULT_DATABASE, DEFAULT_LOAD_TIMEOUT,
    DEFAULT_MAX_FILTER_RATIO, DEFAULT_MAX_REDIRECTS, DEFAULT_URL, StreamLoadConfig,
    UnmappedTypePolicy,
};
pub use tables::{BLOCK_FIELDS, BLOCK_TIME_DERIVED, TRANSACTION_FIELDS, TableConfig, default_tables};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Stream load endpoint and batching settings
    pub stream_load: StreamLoadConfig,

    /// Record type → table mappings, in load order
    pub tables: Vec<TableConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            stream_load: StreamLoadConfig::default(),
            tables: default_tables(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Look up the mapping for a record type
    pub fn table_for(&self, record_type: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|t| t.record_type == record_type)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
