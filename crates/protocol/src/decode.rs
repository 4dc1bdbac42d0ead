//! JSON-lines decoding
//!
//! The extraction pipeline emits one JSON object per line. Blank lines are
//! ignored; every other line must decode into a `Record`.

use std::io::BufRead;

use serde_json::Value;

use crate::error::ProtocolError;
use crate::record::Record;

/// Decode a single JSON object into a record
pub fn decode_record(line: &str) -> Result<Record, ProtocolError> {
    decode_line(line, 1)
}

fn decode_line(line: &str, line_no: usize) -> Result<Record, ProtocolError> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| ProtocolError::invalid_json(line_no, e))?;
    Record::from_value_at(value, line_no)
}

/// Iterator over records read from a JSON-lines stream
pub struct RecordReader<R> {
    input: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> RecordReader<R> {
    /// Create a reader over a buffered input
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.line
    }

    /// Read up to `max` records
    ///
    /// Returns an empty vector at end of input.
    pub fn next_chunk(&mut self, max: usize) -> Result<Vec<Record>, ProtocolError> {
        let mut chunk = Vec::with_capacity(max.min(4096));
        while chunk.len() < max {
            match self.next() {
                Some(record) => chunk.push(record?),
                None => break,
            }
        }
        Ok(chunk)
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.input.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    let trimmed = self.buf.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(decode_line(trimmed, self.line));
                }
                Err(e) => return Some(Err(ProtocolError::Io(e))),
            }
        }
    }
}
