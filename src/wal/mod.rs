//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append log records before any mutation is applied in memory
//! - fsync every appended block before returning
//! - Keep transaction blocks contiguous (no interleaving between writers)
//! - Crash recovery and replay
//!
//! ## File Format
//! A plain text file, one record per line, tokens separated by spaces:
//! ```text
//! SET <key> <value>                 direct write
//! BEGIN <txn_id>                    transaction start marker
//! SET <txn_id> <key> <value>        buffered write of a transaction
//! COMMIT <txn_id>                   transaction end marker
//! ```
//!
//! Tokens are separated by exactly one space. An empty value is written as
//! an empty last token (`SET k ` and `SET 7 k `), so it keeps its token count.
//! A direct `SET` and a transactional `SET` are told apart by that count only.
//! Keys and values are written verbatim, so a value containing whitespace
//! does not survive replay. This is a known limitation of the format, not
//! something recovery tries to repair.
//!
//! Every record ends with a newline. A final line without one is treated as
//! the remains of an interrupted append: recovery never parses it and cuts it
//! from the file, even when its text would be a complete record such as
//! `COMMIT 5`. A log edited by hand must end with a newline.

mod record;
mod writer;
mod reader;
mod recovery;

pub use record::WalRecord;
pub use writer::{LogFile, WalWriter};
pub use reader::{WalLine, WalReader};
pub use recovery::{WalRecovery, RecoveryResult};
