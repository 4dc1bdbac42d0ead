//! Load command - Stream JSON-lines records into StarRocks
//!
//! Records are read in batches and handed to the exporter. A batch is only
//! cut right before a counting-type record (a block), so each export call
//! carries whole blocks with their transactions and every call that sees a
//! block loads what it staged.
//!
//! # Usage
//!
//! ```bash
//! chainload load --config chainload.toml --input export.json
//! cat export.json | chainload load --config chainload.toml --batch-size 5000
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::Peekable;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chainload_config::Config;
use chainload_protocol::{ProtocolError, Record, RecordReader};
use chainload_sinks::starrocks::{MetricsSnapshot, StreamLoadClient, StreamLoadExporter, StreamLoader};
use clap::Args;
use tracing::{error, info};

/// Minimum records per export call
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Load command arguments
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Path to configuration file (built-in defaults if omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON-lines input file, `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Minimum records per export call; batches end before a block record
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

/// Run the load command
pub async fn run(args: LoadArgs, config: Config) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        input = %args.input.display(),
        url = %config.stream_load.url,
        database = %config.stream_load.database,
        tables = config.tables.len(),
        "chainload starting"
    );

    let input = open_input(&args.input)?;
    let client = StreamLoadClient::new(&config.stream_load).context("failed to create stream load client")?;
    let exporter = StreamLoadExporter::new(&config, client);

    match load_stream(input, exporter, &config.stream_load.counting_type, args.batch_size).await {
        Ok(summary) => {
            info!(
                lines = summary.lines,
                staged = summary.metrics.records_staged,
                skipped = summary.metrics.records_skipped,
                flushes = summary.metrics.flushes,
                loads = summary.metrics.loads,
                rows_loaded = summary.metrics.rows_loaded,
                rows_filtered = summary.metrics.rows_filtered,
                publish_timeouts = summary.metrics.publish_timeouts,
                "chainload finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "chainload aborted");
            Err(e)
        }
    }
}

/// Outcome of a completed load
#[derive(Debug, Clone, Copy)]
pub struct LoadSummary {
    /// Input lines consumed
    pub lines: usize,
    pub metrics: MetricsSnapshot,
}

/// Open the input file, or stdin for `-`
fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("failed to open input {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Drive the exporter over a JSON-lines stream
///
/// Any decode or export error stops the run; a fatal load error leaves the
/// exporter halted with its staging files on disk.
///
/// `input` is read with blocking calls on the runtime thread. Reads and
/// loads strictly alternate and nothing else runs on the runtime, so the
/// binary uses a current-thread runtime and never moves the reader to a
/// blocking pool.
pub async fn load_stream<R, L>(
    input: R,
    mut exporter: StreamLoadExporter<L>,
    counting_type: &str,
    batch_size: usize,
) -> Result<LoadSummary>
where
    R: BufRead,
    L: StreamLoader,
{
    exporter.open().context("failed to open staging files")?;

    let mut reader = RecordReader::new(input);
    let mut records = reader.by_ref().peekable();

    loop {
        let batch = next_batch(&mut records, counting_type, batch_size)?;
        if batch.is_empty() {
            break;
        }
        exporter
            .export_items(&batch)
            .await
            .with_context(|| format!("failed to export batch of {} records", batch.len()))?;
    }
    drop(records);

    exporter.close().await.context("failed to close exporter")?;

    Ok(LoadSummary {
        lines: reader.lines_read(),
        metrics: exporter.metrics(),
    })
}

/// Take at least `batch_size` records, stopping before the next
/// counting-type record (or at end of input)
fn next_batch<I>(
    records: &mut Peekable<I>,
    counting_type: &str,
    batch_size: usize,
) -> Result<Vec<Record>, ProtocolError>
where
    I: Iterator<Item = Result<Record, ProtocolError>>,
{
    let mut batch = Vec::with_capacity(batch_size.min(4096));

    loop {
        let at_boundary = match records.peek() {
            None => break,
            Some(Ok(record)) => record.record_type().as_str() == counting_type,
            Some(Err(_)) => false,
        };
        if at_boundary && batch.len() >= batch_size.max(1) {
            break;
        }
        match records.next() {
            Some(record) => batch.push(record?),
            None => break,
        }
    }

    Ok(batch)
}

#[cfg(test)]
#[path = "load_test.rs"]
mod load_test;
