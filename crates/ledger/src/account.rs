use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_core::{AccountId, AggregateRoot, TransferError, TransferResult, UserId};

/// Product kind of a bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Checking,
    Savings,
    FixedDeposit,
}

/// Lifecycle state of a bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Pending,
    Active,
    Frozen,
    Closed,
}

/// Canonical balance state of one account.
///
/// `available_balance` is spendable funds net of holds, `actual_balance` is the
/// settled balance of record. `available <= actual` is not enforced here.
///
/// `version` is the store revision this value was read at; the ledger store
/// rejects writes whose version no longer matches the committed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    account_id: AccountId,
    account_number: String,
    account_type: AccountType,
    account_status: AccountStatus,
    available_balance: Decimal,
    actual_balance: Decimal,
    owner: UserId,
    version: u64,
}

impl Account {
    /// A new, active account with both balances set to `opening_balance`.
    pub fn open(
        account_number: impl Into<String>,
        account_type: AccountType,
        owner: UserId,
        opening_balance: Decimal,
    ) -> Self {
        Self {
            account_id: AccountId::new(),
            account_number: account_number.into(),
            account_type,
            account_status: AccountStatus::Active,
            available_balance: opening_balance,
            actual_balance: opening_balance,
            owner,
            version: 0,
        }
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.account_status = status;
        self
    }

    /// Overrides both balances independently (e.g. an account with holds).
    pub fn with_balances(mut self, available: Decimal, actual: Decimal) -> Self {
        self.available_balance = available;
        self.actual_balance = actual;
        self
    }

    /// Stamp the store revision. Only ledger stores should call this.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn account_status(&self) -> AccountStatus {
        self.account_status
    }

    pub fn available_balance(&self) -> Decimal {
        self.available_balance
    }

    pub fn actual_balance(&self) -> Decimal {
        self.actual_balance
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Debit both balances in lockstep.
    pub(crate) fn debit(&mut self, amount: Decimal) -> TransferResult<()> {
        let available = self.exact_sub(self.available_balance, amount)?;
        let actual = self.exact_sub(self.actual_balance, amount)?;
        self.available_balance = available;
        self.actual_balance = actual;
        Ok(())
    }

    /// Credit both balances in lockstep.
    pub(crate) fn credit(&mut self, amount: Decimal) -> TransferResult<()> {
        let available = self.exact_add(self.available_balance, amount)?;
        let actual = self.exact_add(self.actual_balance, amount)?;
        self.available_balance = available;
        self.actual_balance = actual;
        Ok(())
    }

    /// Utility payments settle against `actual_balance` but raise
    /// `available_balance` by the same amount.
    // TODO: confirm whether raising available_balance here is intended (open question in DESIGN.md).
    pub(crate) fn pay_utility(&mut self, amount: Decimal) -> TransferResult<()> {
        let actual = self.exact_sub(self.actual_balance, amount)?;
        let available = self.exact_add(self.available_balance, amount)?;
        self.actual_balance = actual;
        self.available_balance = available;
        Ok(())
    }

    // `Decimal` rounds results past 28 significant digits, so a sum that
    // fits can still drop part of `amount`. Both helpers verify the exact delta.
    fn exact_add(&self, balance: Decimal, amount: Decimal) -> TransferResult<Decimal> {
        balance
            .checked_add(amount)
            .filter(|next| next.checked_sub(balance) == Some(amount))
            .ok_or_else(|| self.overflow(amount))
    }

    fn exact_sub(&self, balance: Decimal, amount: Decimal) -> TransferResult<Decimal> {
        balance
            .checked_sub(amount)
            .filter(|next| balance.checked_sub(*next) == Some(amount))
            .ok_or_else(|| self.overflow(amount))
    }

    fn overflow(&self, amount: Decimal) -> TransferError {
        TransferError::BalanceOverflow {
            account_number: self.account_number.clone(),
            amount,
        }
    }
}

impl AggregateRoot for Account {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.account_number
    }

    fn version(&self) -> u64 {
        self.version
    }
}
