//! WAL record definitions
//!
//! Defines the four line shapes that make up the log and how they are
//! rendered to and parsed from text.

use std::fmt;

use crate::transaction::TxnId;

/// A single line in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalRecord {
    /// `SET <key> <value>`: a non-transactional write
    DirectSet { key: String, value: String },

    /// `BEGIN <txn_id>`: opens a transaction block
    Begin { txn_id: TxnId },

    /// `SET <txn_id> <key> <value>`: a buffered write inside a block
    TxnSet { txn_id: TxnId, key: String, value: String },

    /// `COMMIT <txn_id>`: closes a block; replay applies it only if present
    Commit { txn_id: TxnId },
}

impl WalRecord {
    /// Parse one log line
    ///
    /// Tokens are separated by exactly one space, the way `Display` renders
    /// them, so an empty value survives as an empty last token.
    ///
    /// Returns `None` for anything that is not exactly one of the four shapes
    /// (unknown keyword, wrong token count, non-numeric transaction id, empty key).
    pub fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split(' ').collect();

        match tokens.as_slice() {
            ["BEGIN", id] => Some(WalRecord::Begin {
                txn_id: id.parse().ok()?,
            }),
            ["COMMIT", id] => Some(WalRecord::Commit {
                txn_id: id.parse().ok()?,
            }),
            ["SET", key, value] if !key.is_empty() => Some(WalRecord::DirectSet {
                key: (*key).to_string(),
                value: (*value).to_string(),
            }),
            ["SET", id, key, value] if !key.is_empty() => Some(WalRecord::TxnSet {
                txn_id: id.parse().ok()?,
                key: (*key).to_string(),
                value: (*value).to_string(),
            }),
            _ => None,
        }
    }

    /// Transaction id carried by this record, if any
    pub fn txn_id(&self) -> Option<TxnId> {
        match self {
            WalRecord::DirectSet { .. } => None,
            WalRecord::Begin { txn_id }
            | WalRecord::TxnSet { txn_id, .. }
            | WalRecord::Commit { txn_id } => Some(*txn_id),
        }
    }
}

impl fmt::Display for WalRecord {
    /// Renders the record without the trailing newline
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalRecord::DirectSet { key, value } => write!(f, "SET {} {}", key, value),
            WalRecord::Begin { txn_id } => write!(f, "BEGIN {}", txn_id),
            WalRecord::TxnSet { txn_id, key, value } => {
                write!(f, "SET {} {} {}", txn_id, key, value)
            }
            WalRecord::Commit { txn_id } => write!(f, "COMMIT {}", txn_id),
        }
    }
}
