//! Protocol error types
//!
//! Errors that can occur when decoding records from the upstream feed.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Line is not valid JSON
    #[error("line {line}: invalid JSON: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Item is valid JSON but not an object
    #[error("line {line}: expected a JSON object, got {kind}")]
    NotAnObject { line: usize, kind: &'static str },

    /// Item has no string `type` attribute
    #[error("line {line}: missing string field 'type'")]
    MissingType { line: usize },

    /// Failed to read from the input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Create an invalid JSON error
    #[inline]
    pub fn invalid_json(line: usize, source: serde_json::Error) -> Self {
        Self::InvalidJson { line, source }
    }

    /// Create a not-an-object error
    #[inline]
    pub fn not_an_object(line: usize, kind: &'static str) -> Self {
        Self::NotAnObject { line, kind }
    }

    /// Create a missing type error
    #[inline]
    pub fn missing_type(line: usize) -> Self {
        Self::MissingType { line }
    }

    /// Line number the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidJson { line, .. }
            | Self::NotAnObject { line, .. }
            | Self::MissingType { line } => Some(*line),
            Self::Io(_) => None,
        }
    }
}
