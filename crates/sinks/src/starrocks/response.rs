//! Stream load response parsing and classification
//!
//! The load endpoint answers with a JSON document such as:
//!
//! ```json
//! {"TxnId": 1003, "Label": "eth_blocks_1700000000_123456_0", "Status": "Success",
//!  "Message": "OK", "NumberTotalRows": 1000, "NumberLoadedRows": 999,
//!  "NumberFilteredRows": 1, "LoadBytes": 40888, "LoadTimeMs": 2144}
//! ```
//!
//! Only three outcomes are acceptable; everything else is fatal.

use serde::Deserialize;

/// Status of a committed load
pub const STATUS_SUCCESS: &str = "Success";

/// Status of a committed load whose publish has not finished yet
pub const STATUS_PUBLISH_TIMEOUT: &str = "Publish Timeout";

/// Message of a load whose file contained no rows
pub const MESSAGE_NO_DATA: &str = "all partitions have no load data";

/// Parsed response body
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct StreamLoadResponse {
    pub txn_id: Option<i64>,
    pub label: Option<String>,
    pub status: String,
    pub message: String,
    pub number_total_rows: u64,
    pub number_loaded_rows: u64,
    pub number_filtered_rows: u64,
    pub number_unselected_rows: u64,
    pub load_bytes: u64,
    pub load_time_ms: u64,
    #[serde(rename = "ErrorURL")]
    pub error_url: Option<String>,
}

/// Non-fatal load outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rows committed and visible
    Success,
    /// Rows committed, visibility delayed; must not be retried
    PublishTimeout,
    /// File had no rows
    NoData,
}

impl LoadOutcome {
    /// Short name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PublishTimeout => "publish_timeout",
            Self::NoData => "no_data",
        }
    }
}

/// Classify a (status, message) pair; `None` means fatal
pub fn classify(status: &str, message: &str) -> Option<LoadOutcome> {
    if status == STATUS_SUCCESS {
        Some(LoadOutcome::Success)
    } else if status == STATUS_PUBLISH_TIMEOUT {
        Some(LoadOutcome::PublishTimeout)
    } else if message == MESSAGE_NO_DATA {
        Some(LoadOutcome::NoData)
    } else {
        None
    }
}

impl StreamLoadResponse {
    /// Parse a response body
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Classify this response; `None` means fatal
    pub fn outcome(&self) -> Option<LoadOutcome> {
        classify(&self.status, &self.message)
    }
}
