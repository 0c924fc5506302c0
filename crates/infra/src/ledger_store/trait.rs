use std::sync::Arc;

use thiserror::Error;

use ledgerline_core::{TransferError, TransferId, UserId};
use ledgerline_ledger::{Account, TransactionEntry};

use crate::transaction_log::TransactionLogError;

/// Ledger store operation error.
///
/// These are **infrastructure errors** (storage, concurrency) as opposed to the
/// deterministic validation failures the transfer engine reports.
///
/// ## Error Categories
///
/// - **Conflict**: a submitted account was read at a version that is no longer current
/// - **InvalidUpdate**: the batch is malformed (mixed transfer ids, orphan entries, ...)
/// - **UnknownAccount**: the batch references an account the store does not hold
/// - **DuplicateAccount**: seeding an account number that already exists
/// - **Log**: the transaction log refused the entries (nothing was written)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("account {0} already exists")]
    DuplicateAccount(String),

    #[error("transaction log rejected entries: {0}")]
    Log(#[from] TransactionLogError),

    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
}

impl From<LedgerStoreError> for TransferError {
    fn from(value: LedgerStoreError) -> Self {
        TransferError::store(value.to_string())
    }
}

/// Canonical balance state, keyed by account number.
///
/// ## Atomic Update Semantics
///
/// `atomic_update()`:
/// - Requires every entry to share one transfer id and to belong to a submitted account
/// - Checks each submitted account's version against the committed record
/// - Appends the entries to the transaction log and writes every balance, or writes nothing
/// - Advances each written account's version by one
///
/// Transfers over disjoint account sets never wait on each other; transfers that
/// share an account are serialized on that account's record. A stale read
/// surfaces as `Conflict` and the caller must re-read before retrying.
pub trait LedgerStore: Send + Sync {
    /// Snapshot of one account, stamped with its current version.
    fn get_account(&self, account_number: &str) -> Result<Option<Account>, LedgerStoreError>;

    /// Commit balance writes and log entries as one all-or-nothing unit.
    fn atomic_update(
        &self,
        accounts: Vec<Account>,
        entries: Vec<TransactionEntry>,
    ) -> Result<TransferId, LedgerStoreError>;

    /// Seed a new account record at version 0.
    fn open_account(&self, account: Account) -> Result<(), LedgerStoreError>;

    /// All accounts owned by a user, ordered by account number.
    fn accounts_for_owner(&self, owner: UserId) -> Result<Vec<Account>, LedgerStoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn get_account(&self, account_number: &str) -> Result<Option<Account>, LedgerStoreError> {
        (**self).get_account(account_number)
    }

    fn atomic_update(
        &self,
        accounts: Vec<Account>,
        entries: Vec<TransactionEntry>,
    ) -> Result<TransferId, LedgerStoreError> {
        (**self).atomic_update(accounts, entries)
    }

    fn open_account(&self, account: Account) -> Result<(), LedgerStoreError> {
        (**self).open_account(account)
    }

    fn accounts_for_owner(&self, owner: UserId) -> Result<Vec<Account>, LedgerStoreError> {
        (**self).accounts_for_owner(owner)
    }
}
