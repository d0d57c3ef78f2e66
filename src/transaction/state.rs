//! Transaction state.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{KvError, Result};
use super::TxnId;

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is active and can perform operations.
    Active,
    /// Transaction has been committed.
    Committed,
    /// Transaction has been rolled back.
    RolledBack,
}

/// A buffered unit of work against one engine.
///
/// Writes stay in a private buffer until [`commit`](Transaction::commit),
/// which logs them as one WAL block and applies them to the engine under a
/// single write lock. Nothing reaches the WAL before that.
pub struct Transaction {
    /// Transaction ID.
    id: TxnId,
    /// Current state.
    state: TransactionState,
    /// Pending writes, kept sorted so the WAL block is deterministic.
    writes: BTreeMap<String, String>,
    /// Engine this transaction reads from and commits into.
    engine: Arc<Engine>,
}

impl Transaction {
    /// Creates a new active transaction.
    pub(crate) fn new(id: TxnId, engine: Arc<Engine>) -> Self {
        Self {
            id,
            state: TransactionState::Active,
            writes: BTreeMap::new(),
            engine,
        }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TxnId {
        self.id
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if the transaction is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Returns the number of buffered writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Reads a key, preferring this transaction's own buffered write.
    ///
    /// Falls back to the engine's committed map under its shared lock.
    pub fn get(&self, key: &str) -> Result<String> {
        if !self.is_active() {
            return Err(KvError::TxnNotActive(self.id));
        }

        if let Some(value) = self.writes.get(key) {
            return Ok(value.clone());
        }

        self.engine.get(key)
    }

    /// Buffers a write. No WAL record is written and the engine is untouched.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        if !self.is_active() {
            return Err(KvError::TxnNotActive(self.id));
        }

        let key = key.into();
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }

        self.writes.insert(key, value.into());
        Ok(())
    }

    /// Commits all buffered writes atomically.
    ///
    /// On a WAL failure the error is returned and the transaction stays
    /// active with its buffer intact.
    pub fn commit(&mut self) -> Result<()> {
        if !self.is_active() {
            return Err(KvError::TxnFinished(self.id));
        }

        self.engine.apply_commit(self.id, &self.writes)?;

        self.state = TransactionState::Committed;
        self.writes.clear();
        Ok(())
    }

    /// Discards all buffered writes.
    pub fn rollback(&mut self) -> Result<()> {
        if !self.is_active() {
            return Err(KvError::TxnFinished(self.id));
        }

        self.writes.clear();
        self.state = TransactionState::RolledBack;
        tracing::debug!("Transaction {} rolled back", self.id);
        Ok(())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}
