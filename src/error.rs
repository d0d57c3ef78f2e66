//! Error types for txkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::protocol::Status;
use crate::transaction::TxnId;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for txkv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// WAL append, durable flush, or other file failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    NotFound,

    #[error("Transaction {0} not found")]
    TxnNotFound(TxnId),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: key must not be empty")]
    InvalidKey,

    // -------------------------------------------------------------------------
    // Transaction State Errors
    // -------------------------------------------------------------------------
    /// Get/Set on a transaction that already committed or rolled back
    #[error("Transaction {0} is not active")]
    TxnNotActive(TxnId),

    /// Commit/Rollback on a transaction that already committed or rolled back
    #[error("Transaction {0} already finished")]
    TxnFinished(TxnId),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Failure reported by a remote server, as seen by a client
    #[error("Server returned {status:?}: {message}")]
    Server { status: Status, message: String },
}

impl KvError {
    /// Whether this error means the requested key or transaction does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            KvError::NotFound
                | KvError::TxnNotFound(_)
                | KvError::Server { status: Status::NotFound, .. }
        )
    }

    /// Whether this error was caused by the caller's request rather than the server
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            KvError::InvalidKey
                | KvError::TxnNotActive(_)
                | KvError::TxnFinished(_)
                | KvError::Protocol(_)
                | KvError::Server { status: Status::BadRequest, .. }
        )
    }
}
