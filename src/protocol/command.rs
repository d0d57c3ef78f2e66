//! Command definitions
//!
//! Represents commands from clients.

use crate::transaction::TxnId;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Set = 0x02,
    Begin = 0x03,
    TxnGet = 0x04,
    TxnSet = 0x05,
    Commit = 0x06,
    Rollback = 0x07,
    Ping = 0x08,
}

impl CommandType {
    /// Map a wire byte back to a command type
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandType::Get),
            0x02 => Some(CommandType::Set),
            0x03 => Some(CommandType::Begin),
            0x04 => Some(CommandType::TxnGet),
            0x05 => Some(CommandType::TxnSet),
            0x06 => Some(CommandType::Commit),
            0x07 => Some(CommandType::Rollback),
            0x08 => Some(CommandType::Ping),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read a committed value
    Get { key: String },

    /// Write a value outside any transaction
    Set { key: String, value: String },

    /// Start a transaction; replies with its id
    Begin,

    /// Read through a transaction
    TxnGet { txn_id: TxnId, key: String },

    /// Buffer a write in a transaction
    TxnSet { txn_id: TxnId, key: String, value: String },

    /// Commit a transaction
    Commit { txn_id: TxnId },

    /// Roll back a transaction
    Rollback { txn_id: TxnId },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Begin => CommandType::Begin,
            Command::TxnGet { .. } => CommandType::TxnGet,
            Command::TxnSet { .. } => CommandType::TxnSet,
            Command::Commit { .. } => CommandType::Commit,
            Command::Rollback { .. } => CommandType::Rollback,
            Command::Ping => CommandType::Ping,
        }
    }
}
