//! Service Module
//!
//! Routes client commands to the engine and the transaction registry.
//!
//! Transaction commands look the id up in the registry first, so an unknown
//! or already finished id answers `TxnNotFound`. A transaction leaves the
//! registry after a successful commit or rollback. A commit that fails on
//! the WAL keeps it registered and active so the client can retry.

use std::sync::Arc;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::Command;
use crate::transaction::TransactionRegistry;

/// Engine plus transaction registry, shared by all connections
pub struct KvService {
    engine: Arc<Engine>,
    registry: TransactionRegistry,
}

impl KvService {
    /// Wrap an already opened engine
    pub fn new(engine: Arc<Engine>) -> Self {
        let registry = TransactionRegistry::new(Arc::clone(&engine));
        Self { engine, registry }
    }

    /// Open the engine (running recovery) and build the service around it
    pub fn open(config: Config) -> Result<Self> {
        Ok(Self::new(Arc::new(Engine::open(config)?)))
    }

    /// Execute a command
    ///
    /// Returns the textual reply payload, if the command has one.
    pub fn execute(&self, command: Command) -> Result<Option<String>> {
        match command {
            Command::Get { key } => self.engine.get(&key).map(Some),
            Command::Set { key, value } => {
                self.engine.set(&key, &value)?;
                Ok(None)
            }
            Command::Begin => {
                let handle = self.registry.begin();
                let txn_id = handle.lock().id();
                Ok(Some(txn_id.to_string()))
            }
            Command::TxnGet { txn_id, key } => {
                let handle = self.registry.get(txn_id)?;
                let value = handle.lock().get(&key)?;
                Ok(Some(value))
            }
            Command::TxnSet { txn_id, key, value } => {
                let handle = self.registry.get(txn_id)?;
                handle.lock().set(key, value)?;
                Ok(None)
            }
            Command::Commit { txn_id } => {
                let handle = self.registry.get(txn_id)?;
                handle.lock().commit()?;
                self.registry.remove(txn_id);
                Ok(None)
            }
            Command::Rollback { txn_id } => {
                let handle = self.registry.get(txn_id)?;
                handle.lock().rollback()?;
                self.registry.remove(txn_id);
                Ok(None)
            }
            Command::Ping => Ok(Some("PONG".to_string())),
        }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    pub fn registry(&self) -> &TransactionRegistry {
        &self.registry
    }
}
