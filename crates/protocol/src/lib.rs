//! Chainload Protocol - Typed records flowing into the loaders
//!
//! This crate provides the types handed over by the extraction pipeline:
//! - `Record` - One exported item (block, transaction, ...) as a field map
//! - `RecordType` - Tag naming the table/schema a record belongs to
//! - `RecordReader` - JSON-lines decoder producing records
//! - `render_value` - Text rendering of field values for delimited output
//!
//! # Design Principles
//!
//! - **Data-driven types**: `RecordType` is an open string tag, new types are
//!   added through configuration only
//! - **Read-only records**: loaders borrow records, they never mutate them

mod decode;
mod error;
mod record;
mod value;

pub use decode::{RecordReader, decode_record};
pub use error::ProtocolError;
pub use record::{Record, RecordType, TYPE_FIELD};
pub use value::render_value;

// Re-export the field value type so callers do not need serde_json directly
pub use serde_json::{Map, Value};

#[cfg(test)]
mod error_test;
