use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_core::TransferId;

/// Kind of operation that produced a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    FundTransfer,
    UtilityPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Completed,
}

/// One leg of a transfer (immutable once appended).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub transaction_id: TransferId,
    pub transaction_type: TransactionType,
    /// Counterparty account number or payment reference.
    pub reference_number: String,
    /// Account this leg belongs to.
    pub account_number: String,
    /// Negative for a debit, positive for a credit.
    pub amount: Decimal,
    pub status: EntryStatus,
    pub comment: String,
    pub recorded_at: DateTime<Utc>,
}

impl TransactionEntry {
    pub fn is_debit(&self) -> bool {
        self.amount.is_sign_negative()
    }
}
