//! WAL Reader
//!
//! Handles reading lines from the WAL file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use super::WalRecord;

/// One line read from the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalLine {
    /// A complete line that parsed as one of the record shapes
    Record(WalRecord),

    /// A complete line that is not a valid record (or not valid UTF-8)
    Malformed { line_no: u64, text: String },

    /// Bytes after the last newline: an append that never finished
    Torn { offset: u64, len: u64 },
}

/// Reads lines from the WAL file in order
pub struct WalReader {
    reader: BufReader<File>,

    /// Bytes consumed so far
    offset: u64,

    /// Number of lines read so far (1-based once the first line is read)
    line_no: u64,

    /// Set after an I/O error so iteration stops
    failed: bool,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;

        Ok(Self {
            reader: BufReader::new(file),
            offset: 0,
            line_no: 0,
            failed: false,
        })
    }

    /// Read the next line from the WAL
    ///
    /// Returns `Ok(None)` at end of file.
    pub fn next_line(&mut self) -> Result<Option<WalLine>> {
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf)? as u64;
        if n == 0 {
            return Ok(None);
        }

        let start = self.offset;
        self.offset += n;

        if buf.last() != Some(&b'\n') {
            return Ok(Some(WalLine::Torn { offset: start, len: n }));
        }
        buf.pop();
        self.line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(text) => match WalRecord::parse(text) {
                Some(record) => WalLine::Record(record),
                None => WalLine::Malformed {
                    line_no: self.line_no,
                    text: text.to_string(),
                },
            },
            Err(_) => WalLine::Malformed {
                line_no: self.line_no,
                text: String::from_utf8_lossy(&buf).into_owned(),
            },
        };

        Ok(Some(line))
    }

    /// Byte offset just past the last line returned
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Iterator for WalReader {
    type Item = Result<WalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.next_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
