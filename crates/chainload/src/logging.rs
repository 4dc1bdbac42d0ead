//! Tracing subscriber setup from the `[log]` section

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chainload_config::{LogConfig, LogFormat, LogLevel, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global tracing subscriber
pub fn init(config: &LogConfig, override_level: Option<LogLevel>) -> Result<()> {
    let filter = filter(config.effective_level(override_level))?;
    let (writer, ansi) = make_writer(&config.output)?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(writer),
            )
            .try_init(),
    }
    .context("failed to initialize logging")
}

/// Filter for a level; dependencies stay at `warn` below `info`
fn filter(level: LogLevel) -> Result<EnvFilter> {
    let directive = match level {
        LogLevel::Trace | LogLevel::Debug => {
            format!("{level},hyper=warn,hyper_util=warn,reqwest=warn")
        }
        _ => level.to_string(),
    };
    EnvFilter::try_new(&directive).map_err(|e| anyhow::anyhow!("invalid log level: {}", e))
}

/// Writer for the output destination, and whether to use ANSI colors
fn make_writer(output: &LogOutput) -> Result<(BoxMakeWriter, bool)> {
    Ok(match output {
        LogOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
        LogOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    })
}
