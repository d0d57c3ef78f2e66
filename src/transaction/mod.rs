//! Transaction Module
//!
//! Buffered client-side transactions and the registry of live ones.
//!
//! ## Lifecycle
//! ```text
//!            commit()
//!   Active ───────────▶ Committed
//!      │
//!      │ rollback()
//!      └──────────────▶ RolledBack
//! ```
//! Both end states are terminal. A commit that fails on the WAL leaves the
//! transaction `Active`, so the caller may call `commit()` again.
//!
//! ## Isolation
//! Read-committed plus read-your-own-writes. Reads of keys the transaction
//! has not written go to the engine's committed map every time, so two reads
//! may see different values if another commit lands in between. Concurrent
//! writers of the same key both succeed; the later commit wins.

mod state;
mod registry;

pub use state::{Transaction, TransactionState};
pub use registry::{TransactionHandle, TransactionRegistry};

/// Transaction identifier, strictly increasing and never reused
pub type TxnId = u64;
