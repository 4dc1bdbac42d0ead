//! Table mapping configuration
//!
//! Maps each record type to its destination table and the ordered list of
//! fields written into staging files. The same list (plus derived columns)
//! is declared in the `columns` header of every load request, so the two can
//! never drift apart.
//!
//! # Example
//!
//! ```toml
//! [[tables]]
//! record_type = "block"
//! table = "blocks"
//! fields = ["number", "hash", "block_timestamp"]
//! derived = ["block_time=from_unixtime(block_timestamp-28800)"]
//! ```

use serde::Deserialize;

/// Block fields exported by the Ethereum extraction pipeline
pub const BLOCK_FIELDS: &[&str] = &[
    "number",
    "hash",
    "parent_hash",
    "nonce",
    "sha3_uncles",
    "logs_bloom",
    "transactions_root",
    "state_root",
    "receipts_root",
    "miner",
    "difficulty",
    "total_difficulty",
    "size",
    "extra_data",
    "gas_limit",
    "gas_used",
    "block_timestamp",
    "transaction_count",
    "base_fee_per_gas",
];

/// Transaction fields exported by the Ethereum extraction pipeline
pub const TRANSACTION_FIELDS: &[&str] = &[
    "hash",
    "nonce",
    "block_hash",
    "block_number",
    "transaction_index",
    "from_address",
    "to_address",
    "value",
    "gas",
    "gas_price",
    "input",
    "block_timestamp",
    "max_fee_per_gas",
    "max_priority_fee_per_gas",
    "transaction_type",
];

/// Derived column converting the unix block timestamp to a DATETIME (UTC+8 source clock)
pub const BLOCK_TIME_DERIVED: &str = "block_time=from_unixtime(block_timestamp-28800)";

/// One record type → table mapping
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    /// Record type as tagged by the upstream pipeline
    pub record_type: String,

    /// Destination table
    pub table: String,

    /// Ordered fields written into the staging file
    pub fields: Vec<String>,

    /// Extra load columns computed by the store (`name=expression`)
    #[serde(default)]
    pub derived: Vec<String>,
}

impl TableConfig {
    /// Create a mapping with no derived columns
    pub fn new<S: Into<String>>(
        record_type: impl Into<String>,
        table: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            table: table.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            derived: Vec::new(),
        }
    }

    /// Add a derived column
    #[must_use]
    pub fn with_derived(mut self, expression: impl Into<String>) -> Self {
        self.derived.push(expression.into());
        self
    }

    /// Default block mapping (`block` → `blocks`)
    pub fn ethereum_blocks() -> Self {
        Self::new("block", "blocks", BLOCK_FIELDS.iter().copied()).with_derived(BLOCK_TIME_DERIVED)
    }

    /// Default transaction mapping (`transaction` → `transactions`)
    pub fn ethereum_transactions() -> Self {
        Self::new("transaction", "transactions", TRANSACTION_FIELDS.iter().copied())
            .with_derived(BLOCK_TIME_DERIVED)
    }

    /// Value of the `columns` load header: fields in order, then derived columns
    pub fn columns_header(&self) -> String {
        self.fields
            .iter()
            .chain(self.derived.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Name of a derived column (the part before `=`)
    pub fn derived_name(expression: &str) -> Option<&str> {
        let (name, expr) = expression.split_once('=')?;
        let name = name.trim();
        if name.is_empty() || expr.trim().is_empty() {
            return None;
        }
        Some(name)
    }
}

/// Default mapping used when no `[[tables]]` are declared
pub fn default_tables() -> Vec<TableConfig> {
    vec![
        TableConfig::ethereum_blocks(),
        TableConfig::ethereum_transactions(),
    ]
}
