//! Registry of live transactions.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::Engine;
use crate::error::{KvError, Result};
use super::{Transaction, TxnId};

/// Shared handle to a registered transaction
pub type TransactionHandle = Arc<Mutex<Transaction>>;

/// Tracks in-flight transactions by id.
///
/// The registry lock only guards the id table. It is never held while a
/// transaction runs, so it cannot deadlock with the engine's locks.
///
/// Entries are not expired: the caller removes a transaction once it has
/// committed or rolled back. An abandoned transaction stays registered.
pub struct TransactionRegistry {
    engine: Arc<Engine>,
    active: Mutex<HashMap<TxnId, TransactionHandle>>,
}

impl TransactionRegistry {
    /// Create an empty registry for the given engine
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Begin a transaction on the engine and register it
    pub fn begin(&self) -> TransactionHandle {
        let mut active = self.active.lock();

        let txn = self.engine.begin_transaction();
        let id = txn.id();
        let handle = Arc::new(Mutex::new(txn));
        active.insert(id, Arc::clone(&handle));

        tracing::debug!("Transaction {} registered ({} live)", id, active.len());
        handle
    }

    /// Look up a live transaction
    pub fn get(&self, id: TxnId) -> Result<TransactionHandle> {
        self.active
            .lock()
            .get(&id)
            .cloned()
            .ok_or(KvError::TxnNotFound(id))
    }

    /// Drop a transaction from the registry, returning it if it was present
    pub fn remove(&self, id: TxnId) -> Option<TransactionHandle> {
        self.active.lock().remove(&id)
    }

    /// Whether a transaction is registered
    pub fn contains(&self, id: TxnId) -> bool {
        self.active.lock().contains_key(&id)
    }

    /// Number of registered transactions
    pub fn len(&self) -> usize {
        self.active.lock().len()
    }

    /// Whether no transaction is registered
    pub fn is_empty(&self) -> bool {
        self.active.lock().is_empty()
    }

    /// Ids of all registered transactions, ascending
    pub fn ids(&self) -> Vec<TxnId> {
        let mut ids: Vec<TxnId> = self.active.lock().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The engine transactions are created on
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}
