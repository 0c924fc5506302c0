use std::sync::Arc;

use thiserror::Error;

use ledgerline_core::TransferId;
use ledgerline_ledger::TransactionEntry;

/// Transaction log operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionLogError {
    /// Entries for this transfer id were already appended (replay).
    #[error("transfer {0} already recorded")]
    DuplicateTransfer(TransferId),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("transaction log unavailable: {0}")]
    Unavailable(String),
}

/// Append-only audit log of ledger entries.
///
/// ## Append Semantics
///
/// `append()`:
/// - Persists every entry of the batch or none of them
/// - Rejects a batch whose transfer id already has entries (replay detection)
/// - Never updates or removes existing entries
///
/// Appends happen only inside a ledger store's atomic update, so an entry is
/// never visible without its matching balance change being committed with it.
///
/// ## Read Semantics
///
/// Lookups return entries in append order. Unknown keys yield an empty vector.
pub trait TransactionLog: Send + Sync {
    fn append(&self, entries: Vec<TransactionEntry>) -> Result<(), TransactionLogError>;

    /// All legs of one transfer, in append order.
    fn find_by_transaction_id(
        &self,
        transaction_id: TransferId,
    ) -> Result<Vec<TransactionEntry>, TransactionLogError>;

    /// Every entry owned by an account, oldest first.
    fn find_by_account(
        &self,
        account_number: &str,
    ) -> Result<Vec<TransactionEntry>, TransactionLogError>;
}

impl<L> TransactionLog for Arc<L>
where
    L: TransactionLog + ?Sized,
{
    fn append(&self, entries: Vec<TransactionEntry>) -> Result<(), TransactionLogError> {
        (**self).append(entries)
    }

    fn find_by_transaction_id(
        &self,
        transaction_id: TransferId,
    ) -> Result<Vec<TransactionEntry>, TransactionLogError> {
        (**self).find_by_transaction_id(transaction_id)
    }

    fn find_by_account(
        &self,
        account_number: &str,
    ) -> Result<Vec<TransactionEntry>, TransactionLogError> {
        (**self).find_by_account(account_number)
    }
}
