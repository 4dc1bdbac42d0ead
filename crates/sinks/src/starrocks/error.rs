//! StarRocks sink errors
//!
//! Every `StreamLoadError` is fatal: the load outcome is unknown or rejected,
//! and retrying could load the same rows twice. Callers surface it to the
//! top level instead of retrying.

use std::io;
use std::time::Duration;

use chainload_protocol::RecordType;

/// Errors from a single stream load request
#[derive(Debug, thiserror::Error)]
pub enum StreamLoadError {
    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Staging file could not be read for upload
    #[error("failed to read staging file '{path}': {source}")]
    ReadStaging {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Load exceeded its wall-clock bound
    #[error("stream load into '{table}' timed out after {timeout:?}")]
    Timeout { table: String, timeout: Duration },

    /// Transport failure
    #[error("stream load request into '{table}' failed: {source}")]
    Http {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-JSON response body
    #[error("stream load into '{table}' returned HTTP {status} with unparseable body: {body}")]
    InvalidResponse {
        table: String,
        status: u16,
        body: String,
    },

    /// Front end kept redirecting
    #[error("stream load into '{table}' exceeded {max} redirects")]
    TooManyRedirects { table: String, max: usize },

    /// Load service reported a failure
    #[error("stream load into '{table}' failed (label {label}): status={status} message={message}")]
    Rejected {
        table: String,
        label: String,
        status: String,
        message: String,
        /// Raw response body
        body: String,
    },
}

impl StreamLoadError {
    /// Table the failed request targeted, if known
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Timeout { table, .. }
            | Self::Http { table, .. }
            | Self::InvalidResponse { table, .. }
            | Self::TooManyRedirects { table, .. }
            | Self::Rejected { table, .. } => Some(table),
            Self::Client(_) | Self::ReadStaging { .. } => None,
        }
    }
}

/// Errors from the batching exporter
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Record type has no table mapping
    #[error("no table mapping for record type '{0}'")]
    Unmapped(RecordType),

    /// `open` has not been called
    #[error("exporter is not open")]
    NotOpen,

    /// `open` was called twice
    #[error("exporter is already open")]
    AlreadyOpen,

    /// A previous load or staging step failed; no further work is accepted
    #[error("exporter halted after a fatal failure")]
    Halted,

    /// Staging file could not be created
    #[error("failed to create staging file in '{path}': {source}")]
    Staging {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Record could not be written to its staging file
    #[error("failed to write record to '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Fatal load failure
    #[error(transparent)]
    Load(#[from] StreamLoadError),
}

impl ExportError {
    /// Create a staging error
    pub fn staging(path: impl Into<String>, source: io::Error) -> Self {
        Self::Staging {
            path: path.into(),
            source,
        }
    }

    /// True if the pipeline must stop (load or staging failure, halted exporter)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Load(_) | Self::Halted | Self::Staging { .. } | Self::Write { .. }
        )
    }
}
