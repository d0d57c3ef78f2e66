//! Engine Module
//!
//! The core storage engine that owns the committed state and the WAL.
//!
//! ## Responsibilities
//! - Serve reads from the committed key-value map
//! - Log every mutation to the WAL before applying it
//! - Hand out transactions with unique, increasing ids
//! - Apply transaction commits as one indivisible step
//! - Manage crash recovery on startup

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::transaction::{Transaction, TxnId};
use crate::wal::{RecoveryResult, WalRecovery, WalWriter};

/// The main storage engine
///
/// ## Concurrency Model
///
/// - **Reads** (`get`, transaction reads): shared lock on `data`
/// - **Writes** (`set`, commits): exclusive lock on `data`, held across the
///   WAL append and the in-memory apply
///
/// Holding the write lock across both steps means the WAL order is exactly
/// the order in which mutations become visible, and a reader never sees
/// part of a commit. The WAL has its own mutex, always taken after `data`.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Write-ahead log for durability
    wal: WalWriter,

    /// Committed key-value state
    data: RwLock<HashMap<String, String>>,

    /// Last transaction id handed out
    last_txn_id: AtomicU64,

    /// What startup recovery found in the WAL
    recovery: RecoveryResult,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Open/create data directory
    /// 2. Replay the WAL if it exists
    /// 3. Open the WAL for appending
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let wal_path = config.data_dir.join(Self::WAL_FILENAME);
        let (data, recovery) = WalRecovery::recover(&wal_path)?;
        let wal = WalWriter::open(&wal_path)?;

        Ok(Self::from_parts(config, wal, data, recovery))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Open using a caller-supplied WAL writer
    ///
    /// The log at `wal.path()` is replayed first; the data directory in
    /// `config` is not touched.
    pub fn with_wal(config: Config, wal: WalWriter) -> Result<Self> {
        let (data, recovery) = WalRecovery::recover(wal.path())?;
        Ok(Self::from_parts(config, wal, data, recovery))
    }

    fn from_parts(
        config: Config,
        wal: WalWriter,
        data: HashMap<String, String>,
        recovery: RecoveryResult,
    ) -> Self {
        tracing::info!(
            "WAL recovery from {}: {} keys, {} direct sets, {} transactions committed, {} incomplete, {} lines skipped",
            wal.path().display(),
            data.len(),
            recovery.direct_sets_applied,
            recovery.transactions_committed,
            recovery.transactions_incomplete,
            recovery.lines_skipped
        );

        Self {
            config,
            wal,
            data: RwLock::new(data),
            last_txn_id: AtomicU64::new(recovery.max_txn_id),
            recovery,
        }
    }

    /// Get the committed value of a key
    pub fn get(&self, key: &str) -> Result<String> {
        self.data.read().get(key).cloned().ok_or(KvError::NotFound)
    }

    /// Write a key directly, outside any transaction
    ///
    /// Steps:
    /// 1. Reject empty keys
    /// 2. Acquire the write lock
    /// 3. Append `SET key value` to the WAL and sync
    /// 4. Apply to the committed map
    ///
    /// If step 3 fails the map is left as it was.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }

        let mut data = self.data.write();
        self.wal.log_direct_set(key, value)?;
        data.insert(key.to_string(), value.to_string());

        tracing::trace!("Direct set of {:?}", key);
        Ok(())
    }

    /// Start a new transaction bound to this engine
    pub fn begin_transaction(self: &Arc<Self>) -> Transaction {
        let id = self.last_txn_id.fetch_add(1, Ordering::SeqCst) + 1;
        Transaction::new(id, Arc::clone(self))
    }

    /// Log and apply a transaction's writes (called by `Transaction::commit`)
    ///
    /// The `BEGIN`/`SET`*/`COMMIT` block and the map update happen under one
    /// hold of the write lock.
    pub(crate) fn apply_commit(&self, txn_id: TxnId, writes: &BTreeMap<String, String>) -> Result<()> {
        let mut data = self.data.write();
        self.wal.log_transaction(txn_id, writes)?;

        for (key, value) in writes {
            data.insert(key.clone(), value.clone());
        }

        tracing::debug!("Transaction {} committed {} write(s)", txn_id, writes.len());
        Ok(())
    }

    /// Close the engine gracefully
    ///
    /// Every append is already synced; this is a final fsync of the log.
    pub fn close(&self) -> Result<()> {
        self.wal.sync()?;
        tracing::info!("Engine closed ({} keys)", self.len());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of committed keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether no key has been committed
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the WAL file path
    pub fn wal_path(&self) -> &Path {
        self.wal.path()
    }

    /// Id of the most recently started transaction (0 if none)
    pub fn last_txn_id(&self) -> TxnId {
        self.last_txn_id.load(Ordering::SeqCst)
    }

    /// What startup recovery found
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
