//! Staging files
//!
//! One append-only file per record type and flush cycle. Names are
//! `{table}_{unix_millis}`; if that name is taken (two cycles inside the same
//! millisecond, or a file left over from a previous run) a `_{n}` suffix is
//! added, so a file being loaded is never reopened by the next cycle.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

/// Write buffer in front of the file
const BUFFER_SIZE: usize = 256 * 1024;

/// Attempts at finding a free name before giving up
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Append-only staging file for one table and cycle
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    table: String,
    created_at_ms: i64,
    file: Option<BufWriter<File>>,
    rows: u64,
    bytes: u64,
}

impl StagingFile {
    /// Create a new staging file for `table` inside `dir`
    pub fn create(dir: &Path, table: &str) -> io::Result<Self> {
        let created_at_ms = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(Self::file_name(table, created_at_ms, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    tracing::debug!(table = %table, path = %path.display(), "staging file created");
                    return Ok(Self {
                        path,
                        table: table.to_string(),
                        created_at_ms,
                        file: Some(BufWriter::with_capacity(BUFFER_SIZE, file)),
                        rows: 0,
                        bytes: 0,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free staging file name for table '{table}'"),
        ))
    }

    /// File name for a table, cycle start and collision attempt
    pub fn file_name(table: &str, created_at_ms: i64, attempt: u32) -> String {
        if attempt == 0 {
            format!("{table}_{created_at_ms}")
        } else {
            format!("{table}_{created_at_ms}_{attempt}")
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Cycle start (unix millis)
    #[inline]
    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    /// Rows written so far
    #[inline]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Bytes handed to the file so far
    #[inline]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Count one complete row
    #[inline]
    pub fn mark_row(&mut self) {
        self.rows += 1;
    }

    /// Flush and close the file
    ///
    /// Best effort: errors are logged and swallowed, and closing an already
    /// closed file does nothing.
    pub fn close(&mut self) {
        let Some(mut writer) = self.file.take() else {
            return;
        };

        if let Err(e) = writer.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to flush staging file");
            return;
        }
        if let Err(e) = writer.get_ref().sync_all() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to sync staging file");
        }
    }

    /// Delete the file from disk (closing it first)
    pub fn remove(&mut self) -> io::Result<()> {
        self.close();
        fs::remove_file(&self.path)
    }
}

impl Write for StagingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(writer) = self.file.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "staging file is closed",
            ));
        };
        let n = writer.write(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        self.close();
    }
}
