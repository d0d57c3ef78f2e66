//! WAL Recovery
//!
//! Handles crash recovery by replaying the WAL.
//!
//! Replay rules:
//! - `SET key value` is applied immediately, in log order
//! - `BEGIN id` opens a fresh pending buffer for `id`
//! - `SET id key value` goes into the pending buffer of `id`
//! - `COMMIT id` merges the pending buffer of `id` into the state
//!
//! A transaction without its `COMMIT` line never becomes visible. Lines that
//! do not parse are skipped so a damaged log still opens.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::Path;

use crate::error::Result;
use crate::transaction::TxnId;
use super::{WalLine, WalReader, WalRecord};

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of complete lines read
    pub lines_read: u64,

    /// Lines ignored: malformed, or referring to a transaction with no open `BEGIN`
    pub lines_skipped: u64,

    /// Direct `SET` records applied
    pub direct_sets_applied: u64,

    /// Transactions whose `COMMIT` was found and applied
    pub transactions_committed: u64,

    /// Transactions with a `BEGIN` but no `COMMIT`
    pub transactions_incomplete: u64,

    /// Highest transaction id seen in any record (0 if none)
    pub max_txn_id: TxnId,

    /// Size of the unterminated final line, if any
    pub torn_tail_bytes: u64,

    /// Whether the torn tail was cut from the file
    pub was_truncated: bool,
}

/// Handles WAL recovery after a crash or restart
pub struct WalRecovery {
    state: HashMap<String, String>,
    pending: HashMap<TxnId, HashMap<String, String>>,
    result: RecoveryResult,
}

impl WalRecovery {
    /// Recover the committed state from a WAL file
    ///
    /// This will:
    /// 1. Replay every complete line, skipping malformed ones
    /// 2. Drop transactions that never committed
    /// 3. Truncate a torn final line so later appends start on a line boundary
    ///
    /// A missing file recovers to an empty state.
    pub fn recover(path: &Path) -> Result<(HashMap<String, String>, RecoveryResult)> {
        if !path.exists() {
            return Ok((HashMap::new(), RecoveryResult::default()));
        }

        let (state, mut result, valid_len) = Self::scan(path)?;

        if result.torn_tail_bytes > 0 {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len)?;
            file.sync_all()?;
            result.was_truncated = true;

            tracing::warn!(
                "Truncated {} byte(s) of torn WAL tail from {}",
                result.torn_tail_bytes,
                path.display()
            );
        }

        Ok((state, result))
    }

    /// Scan a WAL file and report what recovery would do, without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        if !path.exists() {
            return Ok(RecoveryResult::default());
        }

        let (_, result, _) = Self::scan(path)?;
        Ok(result)
    }

    /// Replay the whole file, returning the state, stats, and the length of
    /// the well-formed prefix
    fn scan(path: &Path) -> Result<(HashMap<String, String>, RecoveryResult, u64)> {
        let mut replay = Self {
            state: HashMap::new(),
            pending: HashMap::new(),
            result: RecoveryResult::default(),
        };

        let mut reader = WalReader::open(path)?;
        let mut valid_len = 0;

        while let Some(line) = reader.next_line()? {
            match line {
                WalLine::Record(record) => {
                    replay.result.lines_read += 1;
                    replay.apply(record);
                }
                WalLine::Malformed { line_no, text } => {
                    replay.result.lines_read += 1;
                    replay.result.lines_skipped += 1;
                    tracing::warn!("Skipping malformed WAL line {}: {:?}", line_no, text);
                }
                WalLine::Torn { len, .. } => {
                    replay.result.torn_tail_bytes = len;
                    break;
                }
            }
            valid_len = reader.offset();
        }

        replay.result.transactions_incomplete = replay.pending.len() as u64;
        Ok((replay.state, replay.result, valid_len))
    }

    fn apply(&mut self, record: WalRecord) {
        if let Some(txn_id) = record.txn_id() {
            self.result.max_txn_id = self.result.max_txn_id.max(txn_id);
        }

        match record {
            WalRecord::DirectSet { key, value } => {
                self.state.insert(key, value);
                self.result.direct_sets_applied += 1;
            }
            WalRecord::Begin { txn_id } => {
                self.pending.insert(txn_id, HashMap::new());
            }
            WalRecord::TxnSet { txn_id, key, value } => match self.pending.get_mut(&txn_id) {
                Some(writes) => {
                    writes.insert(key, value);
                }
                None => {
                    self.result.lines_skipped += 1;
                    tracing::debug!("Ignoring WAL write for transaction {} without BEGIN", txn_id);
                }
            },
            WalRecord::Commit { txn_id } => match self.pending.remove(&txn_id) {
                Some(writes) => {
                    self.state.extend(writes);
                    self.result.transactions_committed += 1;
                }
                None => {
                    self.result.lines_skipped += 1;
                    tracing::debug!("Ignoring COMMIT for unknown transaction {}", txn_id);
                }
            },
        }
    }
}
