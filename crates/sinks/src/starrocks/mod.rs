//! StarRocks Sink - Stream Load
//!
//! Batches records into one staging file per record type and bulk-loads each
//! file through the StarRocks stream load HTTP endpoint.
//!
//! # Features
//!
//! - **Type routing**: Records go to the table mapped to their `type`
//! - **Block-triggered flush**: Files are loaded after each call that saw a
//!   counting-type record (blocks by default)
//! - **Location-trusted redirects**: Credentials are re-sent to the back end
//! - **No retry**: Any outcome except `Success`, `Publish Timeout` and "all
//!   partitions have no load data" halts the exporter
//!
//! # Example
//!
//! ```ignore
//! use chainload_sinks::starrocks::{StreamLoadClient, StreamLoadExporter};
//!
//! let client = StreamLoadClient::new(&config.stream_load)?;
//! let mut exporter = StreamLoadExporter::new(&config, client);
//! exporter.open()?;
//! exporter.export_items(&records).await?;
//! exporter.close().await?;
//! ```

mod client;
mod error;
mod exporter;
mod metrics;
mod response;
mod staging;
mod writer;

pub use client::{LoadReport, LoadRequest, StreamLoadClient, StreamLoader, interpret_response, separator_header};
pub use error::{ExportError, StreamLoadError};
pub use exporter::StreamLoadExporter;
pub use metrics::{MetricsSnapshot, StreamLoadMetrics};
pub use response::{
    LoadOutcome, MESSAGE_NO_DATA, STATUS_PUBLISH_TIMEOUT, STATUS_SUCCESS, StreamLoadResponse,
    classify,
};
pub use staging::StagingFile;
pub use writer::{DelimitedWriter, DelimitedWriterFactory, ENCLOSE, ESCAPE, RecordWriter, RecordWriterFactory};

#[cfg(test)]
#[path = "staging_test.rs"]
mod staging_test;
