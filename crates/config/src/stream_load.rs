//! Stream load configuration
//!
//! Connection and request settings for the StarRocks stream load endpoint,
//! plus the batching policy of the exporter feeding it.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default front end HTTP endpoint
pub const DEFAULT_URL: &str = "http://127.0.0.1:8030";

/// Default destination database
pub const DEFAULT_DATABASE: &str = "eth";

/// Default column separator shared by staging files and load requests
pub const DEFAULT_COLUMN_SEPARATOR: char = ',';

/// Default fraction of malformed rows a load may skip
pub const DEFAULT_MAX_FILTER_RATIO: f64 = 0.5;

/// Default wall-clock bound for a single load request
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(1800);

/// Default number of front end → back end redirects to follow
pub const DEFAULT_MAX_REDIRECTS: usize = 3;

/// Default record type whose occurrences trigger a flush
pub const DEFAULT_COUNTING_TYPE: &str = "block";

/// What to do with records whose type has no table mapping
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedTypePolicy {
    /// Fail the export call (default)
    #[default]
    Error,
    /// Log, count and drop the record
    Skip,
}

/// Stream load settings
///
/// # Example
///
/// ```toml
/// [stream_load]
/// url = "http://10.0.0.2:8030"
/// database = "eth"
/// user = "root"
/// password = "secret"
/// column_separator = ","
/// max_filter_ratio = 0.5
/// timeout = "30m"
/// staging_dir = "/var/lib/chainload/staging"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamLoadConfig {
    /// Front end HTTP URL (scheme, host and HTTP port)
    /// Default: "http://127.0.0.1:8030"
    pub url: String,

    /// Destination database
    /// Default: "eth"
    pub database: String,

    /// User for basic authentication
    /// Default: "root"
    pub user: String,

    /// Password for basic authentication
    /// Default: ""
    pub password: String,

    /// Column separator, written into staging files and sent with every load
    /// Default: ","
    pub column_separator: char,

    /// Fraction of rows a load may filter out before failing (0.0 - 1.0)
    /// Default: 0.5
    pub max_filter_ratio: f64,

    /// Hard bound on one load request, transfer included
    /// Default: 30m
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Redirects to follow from front end to back end
    /// Default: 3
    pub max_redirects: usize,

    /// Directory holding staging files
    /// Default: "."
    pub staging_dir: PathBuf,

    /// Write a header line into staging files (sent with `skip_header: 1`)
    /// Default: false
    pub include_header: bool,

    /// Keep staging files after they were loaded
    /// Default: true
    pub keep_staging_files: bool,

    /// Record type whose occurrences trigger a flush
    /// Default: "block"
    pub counting_type: String,

    /// Policy for records without a table mapping
    /// Default: error
    pub unmapped_types: UnmappedTypePolicy,
}

impl Default for StreamLoadConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.into(),
            database: DEFAULT_DATABASE.into(),
            user: "root".into(),
            password: String::new(),
            column_separator: DEFAULT_COLUMN_SEPARATOR,
            max_filter_ratio: DEFAULT_MAX_FILTER_RATIO,
            timeout: DEFAULT_LOAD_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            staging_dir: PathBuf::from("."),
            include_header: false,
            keep_staging_files: true,
            counting_type: DEFAULT_COUNTING_TYPE.into(),
            unmapped_types: UnmappedTypePolicy::Error,
        }
    }
}

impl StreamLoadConfig {
    /// Set the front end URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the destination database
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set authentication credentials
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Set the staging directory
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Set the column separator
    #[must_use]
    pub fn with_column_separator(mut self, separator: char) -> Self {
        self.column_separator = separator;
        self
    }

    /// Set the load timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the counting record type
    #[must_use]
    pub fn with_counting_type(mut self, record_type: impl Into<String>) -> Self {
        self.counting_type = record_type.into();
        self
    }

    /// Set the unmapped type policy
    #[must_use]
    pub fn with_unmapped_types(mut self, policy: UnmappedTypePolicy) -> Self {
        self.unmapped_types = policy;
        self
    }

    /// Keep or delete staging files after loading
    #[must_use]
    pub fn with_keep_staging_files(mut self, keep: bool) -> Self {
        self.keep_staging_files = keep;
        self
    }

    /// Separator as a single byte
    ///
    /// Validation guarantees the separator is ASCII, so this never truncates
    /// on a validated config.
    pub fn separator_byte(&self) -> u8 {
        let mut buf = [0u8; 4];
        self.column_separator.encode_utf8(&mut buf);
        buf[0]
    }

    /// Stream load URL for one table
    pub fn load_url(&self, table: &str) -> String {
        format!(
            "{}/api/{}/{}/_stream_load",
            self.url.trim_end_matches('/'),
            self.database,
            table
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamLoadConfig::default();
        assert_eq!(config.url, "http://127.0.0.1:8030");
        assert_eq!(config.database, "eth");
        assert_eq!(config.column_separator, ',');
        assert_eq!(config.max_filter_ratio, 0.5);
        assert_eq!(config.timeout, Duration::from_secs(1800));
        assert_eq!(config.counting_type, "block");
        assert_eq!(config.unmapped_types, UnmappedTypePolicy::Error);
        assert!(config.keep_staging_files);
        assert!(!config.include_header);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
url = "http://10.148.0.2:8030"
database = "chain"
user = "loader"
password = "pw"
column_separator = "|"
max_filter_ratio = 0.1
timeout = "5m"
max_redirects = 1
staging_dir = "/tmp/staging"
include_header = true
keep_staging_files = false
counting_type = "block"
unmapped_types = "skip"
"#;
        let config: StreamLoadConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.url, "http://10.148.0.2:8030");
        assert_eq!(config.database, "chain");
        assert_eq!(config.user, "loader");
        assert_eq!(config.password, "pw");
        assert_eq!(config.column_separator, '|');
        assert_eq!(config.max_filter_ratio, 0.1);
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.max_redirects, 1);
        assert_eq!(config.staging_dir, PathBuf::from("/tmp/staging"));
        assert!(config.include_header);
        assert!(!config.keep_staging_files);
        assert_eq!(config.unmapped_types, UnmappedTypePolicy::Skip);
    }

    #[test]
    fn test_load_url() {
        let config = StreamLoadConfig::default().with_url("http://fe:8030/");
        assert_eq!(
            config.load_url("blocks"),
            "http://fe:8030/api/eth/blocks/_stream_load"
        );
    }

    #[test]
    fn test_separator_byte() {
        assert_eq!(StreamLoadConfig::default().separator_byte(), b',');
        let config = StreamLoadConfig::default().with_column_separator('\t');
        assert_eq!(config.separator_byte(), b'\t');
    }

    #[test]
    fn test_builders() {
        let config = StreamLoadConfig::default()
            .with_database("db")
            .with_credentials("u", "p")
            .with_staging_dir("/data")
            .with_counting_type("header")
            .with_unmapped_types(UnmappedTypePolicy::Skip)
            .with_keep_staging_files(false);
        assert_eq!(config.database, "db");
        assert_eq!(config.user, "u");
        assert_eq!(config.password, "p");
        assert_eq!(config.staging_dir, PathBuf::from("/data"));
        assert_eq!(config.counting_type, "header");
        assert_eq!(config.unmapped_types, UnmappedTypePolicy::Skip);
        assert!(!config.keep_staging_files);
    }
}
