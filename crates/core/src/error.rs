//! Transfer error model.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the ledger layer.
pub type TransferResult<T> = Result<T, TransferError>;

/// Typed failure of a ledger operation.
///
/// Validation failures are deterministic given the current state and are
/// never retried. `Contention` is the only transient kind: it is what an
/// optimistic write collision becomes once the retry budget is spent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The requested amount is zero or negative.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Source and destination are the same account.
    #[error("cannot transfer from account {0} to itself")]
    SameAccount(String),

    /// The referenced account number has no record.
    #[error("bank account with account number {0} not found")]
    AccountNotFound(String),

    /// The utility provider id could not be resolved.
    #[error("utility provider {0} not found")]
    ProviderNotFound(String),

    /// Available balance is negative or below the requested amount.
    #[error("insufficient balance on account {account_number}: available {available}, requested {requested}")]
    InsufficientBalance {
        account_number: String,
        available: Decimal,
        requested: Decimal,
    },

    /// Applying the amount would overflow a balance or lose precision.
    #[error("balance of account {account_number} cannot absorb {amount} exactly")]
    BalanceOverflow {
        account_number: String,
        amount: Decimal,
    },

    /// No ledger entries exist for the given transfer id.
    #[error("transfer {0} not found")]
    TransferNotFound(String),

    /// Concurrent writes kept colliding; the caller should retry later.
    #[error("ledger contention: gave up after {attempts} attempt(s)")]
    Contention { attempts: u32 },

    /// Infrastructure failure in the ledger store or transaction log.
    #[error("ledger store failure: {0}")]
    Store(String),
}

impl TransferError {
    pub fn account_not_found(account_number: impl Into<String>) -> Self {
        Self::AccountNotFound(account_number.into())
    }

    pub fn provider_not_found(provider_id: impl Into<String>) -> Self {
        Self::ProviderNotFound(provider_id.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// True for failures a caller may retry later (never for validation failures).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Contention { .. })
    }
}
