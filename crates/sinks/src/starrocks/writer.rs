//! Record writers
//!
//! A `RecordWriter` serializes records of one type into its staging file in
//! the table's declared field order. Writers are created per type and cycle
//! by a `RecordWriterFactory`, which lets the serialization format be
//! swapped without touching the exporter.
//!
//! The default `DelimitedWriter` emits one line per record separated by the
//! configured column separator, the same value sent as `column_separator`
//! with the load request.

use std::borrow::Cow;
use std::io::Write;

use chainload_config::{StreamLoadConfig, TableConfig};
use chainload_protocol::Record;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::error::ExportError;
use super::staging::StagingFile;

/// Character enclosing values that contain the separator, a quote or a newline
pub const ENCLOSE: u8 = b'"';

/// Escape character for the enclose character and for itself
pub const ESCAPE: u8 = b'\\';

/// Writes records of one type into one staging file
pub trait RecordWriter: Send {
    /// Append one record
    fn write_record(&mut self, record: &Record) -> Result<(), ExportError>;

    /// Flush buffered rows and close the staging file
    ///
    /// Best effort and idempotent; never fails.
    fn close(&mut self);

    /// The staging file being written
    fn staging(&self) -> &StagingFile;

    /// Mutable access to the staging file (e.g. to delete it after loading)
    fn staging_mut(&mut self) -> &mut StagingFile;
}

/// Creates a writer for a fresh staging file
pub trait RecordWriterFactory: Send + Sync {
    fn create(
        &self,
        file: StagingFile,
        table: &TableConfig,
    ) -> Result<Box<dyn RecordWriter>, ExportError>;
}

/// Delimiter-separated writer
///
/// Each row is encoded with `csv` (quoting only where needed) and appended
/// to the staging file.
pub struct DelimitedWriter {
    encoder: WriterBuilder,
    file: StagingFile,
    fields: Vec<String>,
}

impl DelimitedWriter {
    /// Create a writer over `file` emitting `fields` in order
    pub fn new(file: StagingFile, fields: Vec<String>, separator: u8) -> Self {
        let mut encoder = WriterBuilder::new();
        encoder
            .delimiter(separator)
            .has_headers(false)
            .quote_style(QuoteStyle::Necessary)
            .quote(ENCLOSE)
            .double_quote(false)
            .escape(ESCAPE)
            .terminator(Terminator::Any(b'\n'));

        Self {
            encoder,
            file,
            fields,
        }
    }

    /// Write the field names as the first line
    pub fn write_header(&mut self) -> Result<(), ExportError> {
        let names: Vec<Cow<'_, str>> = self
            .fields
            .iter()
            .map(|f| escape_value(Cow::Borrowed(f.as_str())))
            .collect();
        let line = self.encode(names.iter().map(|v| v.as_bytes()))?;
        self.append(&line)
    }

    fn encode<'a>(&self, row: impl Iterator<Item = &'a [u8]>) -> Result<Vec<u8>, ExportError> {
        let mut wtr = self.encoder.from_writer(Vec::with_capacity(256));
        wtr.write_record(row).map_err(|e| self.write_error(e))?;
        wtr.into_inner()
            .map_err(|e| self.write_error(csv::Error::from(e.into_error())))
    }

    fn append(&mut self, line: &[u8]) -> Result<(), ExportError> {
        self.file
            .write_all(line)
            .map_err(|e| self.write_error(csv::Error::from(e)))
    }

    fn write_error(&self, source: csv::Error) -> ExportError {
        ExportError::Write {
            path: self.file.path().display().to_string(),
            source,
        }
    }
}

impl RecordWriter for DelimitedWriter {
    fn write_record(&mut self, record: &Record) -> Result<(), ExportError> {
        let row: Vec<Cow<'_, str>> = self
            .fields
            .iter()
            .map(|f| escape_value(record.render_field(f)))
            .collect();
        let line = self.encode(row.iter().map(|v| v.as_bytes()))?;
        self.append(&line)?;
        self.file.mark_row();
        Ok(())
    }

    fn close(&mut self) {
        self.file.close();
    }

    fn staging(&self) -> &StagingFile {
        &self.file
    }

    fn staging_mut(&mut self) -> &mut StagingFile {
        &mut self.file
    }
}

/// Double every escape character so the load service reads it literally
///
/// `csv` escapes the enclose character but not the escape character itself,
/// and encloses any value containing one.
fn escape_value(value: Cow<'_, str>) -> Cow<'_, str> {
    if value.contains(ESCAPE as char) {
        Cow::Owned(value.replace('\\', "\\\\"))
    } else {
        value
    }
}

/// Factory for `DelimitedWriter`
#[derive(Debug, Clone, Copy)]
pub struct DelimitedWriterFactory {
    separator: u8,
    include_header: bool,
}

impl DelimitedWriterFactory {
    pub fn new(separator: u8) -> Self {
        Self {
            separator,
            include_header: false,
        }
    }

    /// Take separator and header setting from the stream load config
    pub fn from_config(config: &StreamLoadConfig) -> Self {
        Self {
            separator: config.separator_byte(),
            include_header: config.include_header,
        }
    }

    #[must_use]
    pub fn with_header(mut self, include_header: bool) -> Self {
        self.include_header = include_header;
        self
    }
}

impl RecordWriterFactory for DelimitedWriterFactory {
    fn create(
        &self,
        file: StagingFile,
        table: &TableConfig,
    ) -> Result<Box<dyn RecordWriter>, ExportError> {
        let mut writer = DelimitedWriter::new(file, table.fields.clone(), self.separator);
        if self.include_header {
            writer.write_header()?;
        }
        Ok(Box::new(writer))
    }
}
