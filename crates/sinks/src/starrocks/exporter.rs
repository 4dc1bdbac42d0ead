//! Stream load exporter
//!
//! Routes records into per-type staging files and loads every file once a
//! record of the counting type (blocks by default) has been seen.
//!
//! # Cycle
//!
//! ```text
//! open()          create one staging file + writer per mapped type
//! export_items()  write records; count blocks
//!                 if blocks >= 1: for each type in mapping order
//!                     close file → load → open fresh file + writer
//!                 blocks = 0
//! close()         if blocks >= 1: close file → load (no reopen)
//! ```
//!
//! A block's transactions arrive in the same call as the block itself, so
//! flushing after every call that saw a block keeps loads aligned with chain
//! progress. There is no size or time cap between blocks.
//!
//! Loads run sequentially. A fatal load error halts the exporter: no staging
//! file is reopened and every later call fails with `ExportError::Halted`.
//! Failing to create or write a staging file halts it the same way, since
//! the staged rows no longer match what was exported.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chainload_config::{Config, StreamLoadConfig, TableConfig, UnmappedTypePolicy};
use chainload_protocol::{Record, RecordType};

use super::client::{LoadRequest, StreamLoader};
use super::error::ExportError;
use super::metrics::{MetricsSnapshot, StreamLoadMetrics};
use super::staging::StagingFile;
use super::writer::{DelimitedWriterFactory, RecordWriter, RecordWriterFactory};

/// Resolved mapping for one record type
#[derive(Debug, Clone)]
struct TableRoute {
    record_type: RecordType,
    table: TableConfig,
    columns: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Open,
    Closed,
    Halted,
}

/// Batching exporter in front of a `StreamLoader`
pub struct StreamLoadExporter<L> {
    config: StreamLoadConfig,
    routes: Arc<[TableRoute]>,
    counting_type: RecordType,
    loader: L,
    factory: Box<dyn RecordWriterFactory>,
    writers: HashMap<RecordType, Box<dyn RecordWriter>>,
    counter: u64,
    state: State,
    metrics: Arc<StreamLoadMetrics>,
}

impl<L: StreamLoader> StreamLoadExporter<L> {
    /// Create an exporter for the configured tables
    pub fn new(config: &Config, loader: L) -> Self {
        let routes: Vec<TableRoute> = config
            .tables
            .iter()
            .map(|table| TableRoute {
                record_type: RecordType::new(table.record_type.as_str()),
                columns: table.columns_header(),
                table: table.clone(),
            })
            .collect();

        Self {
            config: config.stream_load.clone(),
            routes: routes.into(),
            counting_type: RecordType::new(config.stream_load.counting_type.as_str()),
            loader,
            factory: Box::new(DelimitedWriterFactory::from_config(&config.stream_load)),
            writers: HashMap::new(),
            counter: 0,
            state: State::Idle,
            metrics: Arc::new(StreamLoadMetrics::new()),
        }
    }

    /// Replace the record writer factory
    #[must_use]
    pub fn with_writer_factory(mut self, factory: impl RecordWriterFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Create the staging directory and one staging file per record type
    pub fn open(&mut self) -> Result<(), ExportError> {
        match self.state {
            State::Idle => {}
            State::Halted => return Err(ExportError::Halted),
            State::Open | State::Closed => return Err(ExportError::AlreadyOpen),
        }

        fs::create_dir_all(&self.config.staging_dir).map_err(|e| {
            ExportError::staging(self.config.staging_dir.display().to_string(), e)
        })?;

        let routes = Arc::clone(&self.routes);
        for route in routes.iter() {
            match self.open_writer(route) {
                Ok(writer) => {
                    self.writers.insert(route.record_type.clone(), writer);
                }
                Err(e) => {
                    self.halt();
                    return Err(e);
                }
            }
        }

        self.state = State::Open;
        tracing::info!(
            tables = self.routes.len(),
            staging_dir = %self.config.staging_dir.display(),
            counting_type = %self.counting_type,
            "stream load exporter opened"
        );
        Ok(())
    }

    /// Write records to their staging files, then flush if a counting-type
    /// record was seen
    pub async fn export_items<'a, I>(&mut self, records: I) -> Result<(), ExportError>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        self.ensure_open()?;

        for record in records {
            let record_type = record.record_type();
            if *record_type == self.counting_type {
                self.counter += 1;
            }

            let Some(writer) = self.writers.get_mut(record_type) else {
                match self.config.unmapped_types {
                    UnmappedTypePolicy::Error => {
                        return Err(ExportError::Unmapped(record_type.clone()));
                    }
                    UnmappedTypePolicy::Skip => {
                        tracing::debug!(record_type = %record_type, "skipping record without table mapping");
                        self.metrics.record_skipped();
                        continue;
                    }
                }
            };

            if let Err(e) = writer.write_record(record) {
                tracing::error!(
                    record_type = %record_type,
                    error = %e,
                    "failed to stage record, halting exporter"
                );
                self.halt();
                return Err(e);
            }
            self.metrics.record_staged();
        }

        if self.counter >= 1 {
            self.flush_all(true).await?;
        }

        Ok(())
    }

    /// Load what is staged and stop
    ///
    /// Without a counting-type record since the last flush nothing is
    /// loaded; staging files are closed and left on disk. Calling `close`
    /// again is a no-op.
    pub async fn close(&mut self) -> Result<(), ExportError> {
        match self.state {
            State::Open => {}
            State::Idle | State::Closed | State::Halted => return Ok(()),
        }

        if self.counter == 0 {
            for (record_type, writer) in self.writers.iter_mut() {
                writer.close();
                let rows = writer.staging().rows();
                if rows > 0 {
                    tracing::warn!(
                        record_type = %record_type,
                        rows,
                        path = %writer.staging().path().display(),
                        "closing without a counting-type record, staged rows not loaded"
                    );
                }
            }
            self.writers.clear();
            self.state = State::Closed;
            tracing::info!("stream load exporter closed, nothing to load");
            return Ok(());
        }

        self.flush_all(false).await?;
        self.state = State::Closed;
        tracing::info!("stream load exporter closed");
        Ok(())
    }

    /// Close, load and (optionally) reopen every staging file in mapping order
    async fn flush_all(&mut self, reopen: bool) -> Result<(), ExportError> {
        let routes = Arc::clone(&self.routes);
        tracing::debug!(counter = self.counter, reopen, "flushing staging files");

        for route in routes.iter() {
            let Some(mut writer) = self.writers.remove(&route.record_type) else {
                return Err(ExportError::NotOpen);
            };
            writer.close();

            let request = LoadRequest {
                record_type: &route.record_type,
                table: &route.table.table,
                columns: &route.columns,
                path: writer.staging().path(),
                rows: writer.staging().rows(),
            };

            match self.loader.load(request).await {
                Ok(report) => {
                    self.metrics.record_load(
                        report.outcome,
                        report.response.number_loaded_rows,
                        report.response.number_filtered_rows,
                    );
                    if !self.config.keep_staging_files {
                        discard(writer.as_mut());
                    }
                }
                Err(e) => {
                    self.metrics.record_failure();
                    tracing::error!(
                        table = %route.table.table,
                        path = %writer.staging().path().display(),
                        error = %e,
                        "fatal stream load failure, halting exporter"
                    );
                    self.halt();
                    return Err(e.into());
                }
            }

            if reopen {
                match self.open_writer(route) {
                    Ok(writer) => {
                        self.writers.insert(route.record_type.clone(), writer);
                    }
                    Err(e) => {
                        tracing::error!(
                            table = %route.table.table,
                            error = %e,
                            "failed to reopen staging file, halting exporter"
                        );
                        self.halt();
                        return Err(e);
                    }
                }
            }
        }

        self.counter = 0;
        self.metrics.record_flush();
        Ok(())
    }

    fn open_writer(&self, route: &TableRoute) -> Result<Box<dyn RecordWriter>, ExportError> {
        let dir = &self.config.staging_dir;
        let file = StagingFile::create(dir, &route.table.table)
            .map_err(|e| ExportError::staging(dir.display().to_string(), e))?;
        self.factory.create(file, &route.table)
    }

    /// Close remaining writers (files stay on disk for inspection) and stop
    fn halt(&mut self) {
        for writer in self.writers.values_mut() {
            writer.close();
        }
        self.writers.clear();
        self.state = State::Halted;
    }

    fn ensure_open(&self) -> Result<(), ExportError> {
        match self.state {
            State::Open => Ok(()),
            State::Halted => Err(ExportError::Halted),
            State::Idle | State::Closed => Err(ExportError::NotOpen),
        }
    }

    /// Counting-type records seen since the last flush
    pub fn pending_trigger(&self) -> u64 {
        self.counter
    }

    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }

    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// Current staging file of a record type
    pub fn staging_path(&self, record_type: &str) -> Option<&Path> {
        self.writers.get(record_type).map(|w| w.staging().path())
    }

    /// Staging directory
    pub fn staging_dir(&self) -> &Path {
        &self.config.staging_dir
    }

    /// The loader (used by tests to inspect recorded calls)
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Shared metrics counters
    pub fn metrics_handle(&self) -> Arc<StreamLoadMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Delete a loaded staging file, best effort
fn discard(writer: &mut dyn RecordWriter) {
    let staging = writer.staging_mut();
    if let Err(e) = staging.remove() {
        tracing::warn!(path = %staging.path().display(), error = %e, "failed to delete staging file");
    }
}
