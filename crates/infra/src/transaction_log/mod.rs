//! Append-only transaction log boundary.
//!
//! Audit trail of every balance mutation, keyed by transfer id.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryTransactionLog;
pub use r#trait::{TransactionLog, TransactionLogError};
