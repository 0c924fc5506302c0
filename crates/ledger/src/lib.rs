//! Ledger module (accounts, ledger entries, transfer planning).
//!
//! Pure domain logic only: no IO, no locking, no persistence concerns.

pub mod account;
pub mod entry;
pub mod transfer;

pub use account::{Account, AccountStatus, AccountType};
pub use entry::{EntryStatus, TransactionEntry, TransactionType};
pub use transfer::{
    ensure_distinct_accounts, ensure_positive_amount, ensure_sufficient_balance,
    plan_fund_transfer, plan_utility_payment, FundTransfer, LedgerMutation, TransferReceipt,
    UtilityPayment, FUND_TRANSFER_MESSAGE, UTILITY_PAYMENT_MESSAGE,
};
