//! Infrastructure layer: ledger store, transaction log, provider lookup, transfer engine.

pub mod config;
pub mod ledger_store;
pub mod provider;
pub mod transaction_log;
pub mod transfer_engine;

mod integration_tests;

pub use config::{ConfigError, EngineConfig, RetryPolicy};
pub use ledger_store::{InMemoryLedgerStore, LedgerStore, LedgerStoreError};
pub use provider::{InMemoryProviderRegistry, ProviderAccount, ProviderError, ProviderResolver};
pub use transaction_log::{InMemoryTransactionLog, TransactionLog, TransactionLogError};
pub use transfer_engine::TransferEngine;
