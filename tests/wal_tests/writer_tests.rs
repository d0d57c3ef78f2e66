//! Tests for WAL Writer
//!
//! These tests verify:
//! - Appending single records and blocks
//! - Transaction block layout
//! - Appends never interleave between threads
//! - Failed appends surface as I/O errors and leave no partial line behind

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use txkv::wal::{LogFile, WalRecord, WalRecovery, WalWriter};
use txkv::KvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn read_lines(path: &PathBuf) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

/// In-memory log that accepts a limited number of bytes, then fails every write
#[derive(Clone, Default)]
struct ShortLog {
    state: Arc<Mutex<ShortLogState>>,
}

#[derive(Default)]
struct ShortLogState {
    data: Vec<u8>,
    /// Bytes still accepted before writes fail (`None` = unlimited)
    budget: Option<usize>,
}

impl ShortLog {
    fn with_content(content: &str) -> Self {
        let log = Self::default();
        log.state.lock().data = content.as_bytes().to_vec();
        log
    }

    fn fail_after(&self, bytes: usize) {
        self.state.lock().budget = Some(bytes);
    }

    fn heal(&self) {
        self.state.lock().budget = None;
    }

    fn text(&self) -> String {
        String::from_utf8(self.state.lock().data.clone()).unwrap()
    }
}

impl Write for ShortLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        let n = match state.budget {
            Some(0) => return Err(io::Error::new(io::ErrorKind::Other, "no space left")),
            Some(budget) => buf.len().min(budget),
            None => buf.len(),
        };
        if let Some(budget) = state.budget.as_mut() {
            *budget -= n;
        }
        state.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogFile for ShortLog {
    fn size(&self) -> io::Result<u64> {
        Ok(self.state.lock().data.len() as u64)
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.state.lock().data.truncate(size as usize);
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Basic Writing Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let writer = WalWriter::open(&wal_path).unwrap();

    assert!(wal_path.exists());
    assert_eq!(writer.path(), wal_path.as_path());
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), 0);
}

#[test]
fn test_log_direct_set() {
    let (_temp, wal_path) = setup_temp_wal();
    let writer = WalWriter::open(&wal_path).unwrap();

    writer.log_direct_set("a", "1").unwrap();
    writer.log_direct_set("b", "2").unwrap();

    assert_eq!(read_lines(&wal_path), vec!["SET a 1", "SET b 2"]);
}

#[test]
fn test_log_transaction_block() {
    let (_temp, wal_path) = setup_temp_wal();
    let writer = WalWriter::open(&wal_path).unwrap();

    let mut writes = BTreeMap::new();
    writes.insert("b".to_string(), "2".to_string());
    writes.insert("a".to_string(), "1".to_string());

    writer.log_transaction(3, &writes).unwrap();

    assert_eq!(
        read_lines(&wal_path),
        vec!["BEGIN 3", "SET 3 a 1", "SET 3 b 2", "COMMIT 3"]
    );
}

#[test]
fn test_log_empty_transaction_still_writes_markers() {
    let (_temp, wal_path) = setup_temp_wal();
    let writer = WalWriter::open(&wal_path).unwrap();

    writer.log_transaction(1, &BTreeMap::new()).unwrap();

    assert_eq!(read_lines(&wal_path), vec!["BEGIN 1", "COMMIT 1"]);
}

#[test]
fn test_append_empty_block_is_noop() {
    let (_temp, wal_path) = setup_temp_wal();
    let writer = WalWriter::open(&wal_path).unwrap();

    writer.append(&[]).unwrap();

    assert_eq!(fs::metadata(&wal_path).unwrap().len(), 0);
}

#[test]
fn test_reopen_appends_after_existing_content() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let writer = WalWriter::open(&wal_path).unwrap();
        writer.log_direct_set("first", "1").unwrap();
    }
    {
        let writer = WalWriter::open(&wal_path).unwrap();
        writer.append(&[WalRecord::Begin { txn_id: 1 }, WalRecord::Commit { txn_id: 1 }]).unwrap();
        writer.sync().unwrap();
    }

    assert_eq!(read_lines(&wal_path), vec!["SET first 1", "BEGIN 1", "COMMIT 1"]);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_blocks_do_not_interleave() {
    let (_temp, wal_path) = setup_temp_wal();
    let writer = Arc::new(WalWriter::open(&wal_path).unwrap());

    let mut handles = vec![];
    for t in 0..4u64 {
        let writer = Arc::clone(&writer);
        handles.push(thread::spawn(move || {
            for i in 0..25u64 {
                let txn_id = t * 100 + i + 1;
                let mut writes = BTreeMap::new();
                for k in 0..3 {
                    writes.insert(format!("k{}", k), format!("v{}", txn_id));
                }
                writer.log_transaction(txn_id, &writes).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let records: Vec<WalRecord> = read_lines(&wal_path)
        .iter()
        .map(|l| WalRecord::parse(l).unwrap())
        .collect();
    assert_eq!(records.len(), 100 * 5);

    // Every block of five lines belongs to one transaction, in BEGIN/SET/COMMIT order
    for block in records.chunks(5) {
        let txn_id = match &block[0] {
            WalRecord::Begin { txn_id } => *txn_id,
            other => panic!("Expected BEGIN, got {:?}", other),
        };
        for record in &block[1..4] {
            assert!(matches!(record, WalRecord::TxnSet { txn_id: id, .. } if *id == txn_id));
        }
        assert_eq!(block[4], WalRecord::Commit { txn_id });
    }
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_append_to_read_only_handle_fails() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let read_only = File::open(&wal_path).unwrap();
    let writer = WalWriter::from_file(&wal_path, read_only);

    let result = writer.log_direct_set("k", "v");

    assert!(matches!(result, Err(KvError::Io(_))));
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), 0);
}

#[test]
fn test_partial_append_is_cut_back() {
    let (_temp, wal_path) = setup_temp_wal();
    let log = ShortLog::with_content("SET a 1\n");
    let writer = WalWriter::from_file(&wal_path, log.clone());

    // Only "SET x" reaches the log before the write fails
    log.fail_after(5);
    let err = writer.log_direct_set("x", "y").unwrap_err();
    assert!(matches!(err, KvError::Io(_)));
    assert_eq!(log.text(), "SET a 1\n");

    log.heal();
    writer.log_direct_set("x", "y").unwrap();
    assert_eq!(log.text(), "SET a 1\nSET x y\n");
}

#[test]
fn test_retried_transaction_after_partial_append() {
    let (_temp, wal_path) = setup_temp_wal();
    let log = ShortLog::default();
    let writer = WalWriter::from_file(&wal_path, log.clone());

    let mut writes = BTreeMap::new();
    writes.insert("a".to_string(), "1".to_string());
    writes.insert("b".to_string(), "2".to_string());

    // Fails in the middle of "SET 5 a 1"
    log.fail_after("BEGIN 5\nSET 5 a".len());
    assert!(writer.log_transaction(5, &writes).is_err());
    assert_eq!(log.text(), "");

    log.heal();
    writer.log_transaction(5, &writes).unwrap();
    writer.log_direct_set("c", "3").unwrap();

    let expected = "BEGIN 5\nSET 5 a 1\nSET 5 b 2\nCOMMIT 5\nSET c 3\n";
    assert_eq!(log.text(), expected);

    fs::write(&wal_path, log.text()).unwrap();
    let (state, result) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(state.len(), 3);
    assert_eq!(state.get("a").map(String::as_str), Some("1"));
    assert_eq!(state.get("c").map(String::as_str), Some("3"));
    assert_eq!(result.lines_skipped, 0);
}
