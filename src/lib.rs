//! # txkv
//!
//! An embedded, single-node key-value store with:
//! - Write-Ahead Logging (WAL): every mutation is fsynced before it is applied
//! - Crash recovery that replays direct writes and committed transactions only
//! - Buffered transactions with read-your-own-writes and atomic commit
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     KvService                                │
//! │           (command routing, error mapping)                   │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌──────────────────┐          ┌──────────────────┐
//!   │   Transaction    │─────────▶│      Engine      │
//!   │    Registry      │  commit  │    (RwLock)      │
//!   │    (Mutex)       │          └────────┬─────────┘
//!   └──────────────────┘                   │
//!                                          ▼
//!                                 ┌──────────────────┐
//!                                 │       WAL        │
//!                                 │ (Mutex + fsync)  │
//!                                 └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use txkv::Engine;
//!
//! # fn main() -> txkv::Result<()> {
//! let engine = Arc::new(Engine::open_path(std::path::Path::new("./data"))?);
//! engine.set("a", "1")?;
//!
//! let mut txn = engine.begin_transaction();
//! txn.set("b", "2")?;
//! assert_eq!(txn.get("b")?, "2");
//! txn.commit()?;
//!
//! assert_eq!(engine.get("b")?, "2");
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod engine;
pub mod transaction;
pub mod protocol;
pub mod service;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use engine::Engine;
pub use transaction::{Transaction, TransactionRegistry, TransactionState, TxnId};
pub use service::KvService;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of txkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
