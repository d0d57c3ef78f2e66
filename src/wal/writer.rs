//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::Result;
use crate::transaction::TxnId;
use super::WalRecord;

/// Storage a [`WalWriter`] appends to
///
/// Implemented for [`File`]. Writes must land at the current end, as with a
/// file opened in append mode.
pub trait LogFile: Write + Send {
    /// Current size in bytes
    fn size(&self) -> io::Result<u64>;

    /// Cut the log back to `size` bytes
    fn truncate(&mut self, size: u64) -> io::Result<()>;

    /// Make everything written so far durable
    fn sync(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.set_len(size)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Appends records to the WAL file
///
/// Every append is one `write_all` followed by a sync, done while holding
/// the file mutex. Two callers can therefore never interleave their lines,
/// and a successful return means the whole block reached the disk. A failed
/// append is cut back off the file so the next one starts on a line boundary.
pub struct WalWriter {
    /// Location of the log file
    path: PathBuf,

    /// Log storage, opened in append mode
    file: Mutex<Box<dyn LogFile>>,
}

impl WalWriter {
    /// Open or create a WAL file for appending
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(Self::from_file(path, file))
    }

    /// Wrap an already opened log
    ///
    /// `path` must name the same file; recovery reads the log through it.
    pub fn from_file(path: impl Into<PathBuf>, file: impl LogFile + 'static) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(Box::new(file)),
        }
    }

    /// Append one record block and make it durable
    ///
    /// The block is written with a single `write_all` and synced once at the
    /// end. An empty block is a no-op.
    pub fn append(&self, records: &[WalRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut block = String::new();
        for record in records {
            block.push_str(&record.to_string());
            block.push('\n');
        }

        let mut file = self.file.lock();
        let start = file.size()?;

        if let Err(e) = file.write_all(block.as_bytes()).and_then(|_| file.sync()) {
            tracing::warn!(
                "WAL append of {} record(s) to {} failed: {}",
                records.len(),
                self.path.display(),
                e
            );
            if let Err(cut) = file.truncate(start) {
                tracing::error!(
                    "Could not cut {} back to {} bytes after a failed append: {}",
                    self.path.display(),
                    start,
                    cut
                );
            }
            return Err(e.into());
        }

        Ok(())
    }

    /// Log a non-transactional write as a single `SET key value` line
    pub fn log_direct_set(&self, key: &str, value: &str) -> Result<()> {
        self.append(&[WalRecord::DirectSet {
            key: key.to_string(),
            value: value.to_string(),
        }])
    }

    /// Log a transaction as one `BEGIN` / `SET`* / `COMMIT` block
    pub fn log_transaction(&self, txn_id: TxnId, writes: &BTreeMap<String, String>) -> Result<()> {
        let mut block = Vec::with_capacity(writes.len() + 2);
        block.push(WalRecord::Begin { txn_id });
        block.extend(writes.iter().map(|(key, value)| WalRecord::TxnSet {
            txn_id,
            key: key.clone(),
            value: value.clone(),
        }));
        block.push(WalRecord::Commit { txn_id });

        self.append(&block)
    }

    /// Force sync to disk
    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync()?;
        Ok(())
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
