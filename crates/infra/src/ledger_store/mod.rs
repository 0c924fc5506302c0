//! Ledger store boundary.
//!
//! Canonical account balances plus the single atomic unit-of-work through
//! which every balance change and its log entries are committed.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use r#trait::{LedgerStore, LedgerStoreError};
