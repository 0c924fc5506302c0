//! Transfer planning: validate a request and compute the resulting ledger mutation.
//!
//! Planners are pure. They take accounts as read from the store and return the
//! updated accounts plus the entries to append; the caller submits both as one
//! atomic unit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_core::{TransferError, TransferId, TransferResult};

use crate::account::Account;
use crate::entry::{EntryStatus, TransactionEntry, TransactionType};

pub const FUND_TRANSFER_MESSAGE: &str = "Fund transfer successful";
pub const UTILITY_PAYMENT_MESSAGE: &str = "Utility payment successful";

/// Request: move `amount` from one account to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundTransfer {
    pub from_account_number: String,
    pub to_account_number: String,
    pub amount: Decimal,
}

/// Request: pay `amount` from an account to a utility provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityPayment {
    pub account_number: String,
    pub provider_id: String,
    pub amount: Decimal,
    pub reference_number: String,
}

/// Outcome of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_id: TransferId,
    pub message: String,
}

/// Updated accounts and new entries produced by one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerMutation {
    pub transfer_id: TransferId,
    pub accounts: Vec<Account>,
    pub entries: Vec<TransactionEntry>,
}

pub fn ensure_positive_amount(amount: Decimal) -> TransferResult<()> {
    if amount <= Decimal::ZERO {
        return Err(TransferError::InvalidAmount(amount));
    }
    Ok(())
}

pub fn ensure_distinct_accounts(from: &str, to: &str) -> TransferResult<()> {
    if from == to {
        return Err(TransferError::SameAccount(from.to_string()));
    }
    Ok(())
}

/// Rejects when the available balance is already negative or below `amount`.
///
/// The negative check guards against a corrupted record; it is not a business rule.
pub fn ensure_sufficient_balance(account: &Account, amount: Decimal) -> TransferResult<()> {
    let available = account.available_balance();
    if available < Decimal::ZERO || available < amount {
        return Err(TransferError::InsufficientBalance {
            account_number: account.account_number().to_string(),
            available,
            requested: amount,
        });
    }
    Ok(())
}

/// Plan a two-leg fund transfer.
///
/// Both legs carry the destination account number as their reference.
pub fn plan_fund_transfer(
    mut from: Account,
    mut to: Account,
    amount: Decimal,
    transfer_id: TransferId,
    recorded_at: DateTime<Utc>,
) -> TransferResult<LedgerMutation> {
    ensure_positive_amount(amount)?;
    ensure_distinct_accounts(from.account_number(), to.account_number())?;
    ensure_sufficient_balance(&from, amount)?;

    from.debit(amount)?;
    to.credit(amount)?;

    let reference = to.account_number().to_string();
    let entries = vec![
        TransactionEntry {
            transaction_id: transfer_id,
            transaction_type: TransactionType::FundTransfer,
            reference_number: reference.clone(),
            account_number: from.account_number().to_string(),
            amount: -amount,
            status: EntryStatus::Completed,
            comment: "Fund transfer debit".to_string(),
            recorded_at,
        },
        TransactionEntry {
            transaction_id: transfer_id,
            transaction_type: TransactionType::FundTransfer,
            reference_number: reference,
            account_number: to.account_number().to_string(),
            amount,
            status: EntryStatus::Completed,
            comment: "Fund transfer credit".to_string(),
            recorded_at,
        },
    ];

    Ok(LedgerMutation {
        transfer_id,
        accounts: vec![from, to],
        entries,
    })
}

/// Plan a single-leg utility payment.
pub fn plan_utility_payment(
    mut account: Account,
    amount: Decimal,
    reference_number: impl Into<String>,
    transfer_id: TransferId,
    recorded_at: DateTime<Utc>,
) -> TransferResult<LedgerMutation> {
    ensure_positive_amount(amount)?;
    ensure_sufficient_balance(&account, amount)?;

    account.pay_utility(amount)?;

    let entry = TransactionEntry {
        transaction_id: transfer_id,
        transaction_type: TransactionType::UtilityPayment,
        reference_number: reference_number.into(),
        account_number: account.account_number().to_string(),
        amount: -amount,
        status: EntryStatus::Completed,
        comment: "Utility payment".to_string(),
        recorded_at,
    };

    Ok(LedgerMutation {
        transfer_id,
        accounts: vec![account],
        entries: vec![entry],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use ledgerline_core::UserId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn account(number: &str, balance: Decimal) -> Account {
        Account::open(number, AccountType::Savings, UserId::new(), balance)
    }

    #[test]
    fn fund_transfer_moves_both_balances_and_emits_two_legs() {
        let a = account("A", dec!(100.00));
        let b = account("B", dec!(5.00));
        let id = TransferId::new();

        let plan = plan_fund_transfer(a, b, dec!(30.00), id, Utc::now()).unwrap();

        let (a, b) = (&plan.accounts[0], &plan.accounts[1]);
        assert_eq!(a.available_balance(), dec!(70.00));
        assert_eq!(a.actual_balance(), dec!(70.00));
        assert_eq!(b.available_balance(), dec!(35.00));
        assert_eq!(b.actual_balance(), dec!(35.00));

        assert_eq!(plan.entries.len(), 2);
        assert!(plan.entries.iter().all(|e| e.transaction_id == id));
        assert_eq!(plan.entries[0].amount, dec!(-30.00));
        assert_eq!(plan.entries[0].account_number, "A");
        assert_eq!(plan.entries[1].amount, dec!(30.00));
        assert_eq!(plan.entries[1].account_number, "B");
    }

    #[test]
    fn both_legs_reference_the_destination_account() {
        let plan = plan_fund_transfer(
            account("A", dec!(10)),
            account("B", dec!(0)),
            dec!(1),
            TransferId::new(),
            Utc::now(),
        )
        .unwrap();

        assert!(plan.entries.iter().all(|e| e.reference_number == "B"));
    }

    #[test]
    fn overdraft_is_rejected() {
        let err = plan_fund_transfer(
            account("A", dec!(50.00)),
            account("B", dec!(0)),
            dec!(80.00),
            TransferId::new(),
            Utc::now(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            TransferError::InsufficientBalance {
                account_number: "A".to_string(),
                available: dec!(50.00),
                requested: dec!(80.00),
            }
        );
    }

    #[test]
    fn negative_available_balance_is_rejected_even_for_tiny_amounts() {
        let broken = account("A", dec!(0)).with_balances(dec!(-1), dec!(500));
        assert!(matches!(
            ensure_sufficient_balance(&broken, dec!(0.01)),
            Err(TransferError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn exact_balance_is_sufficient() {
        assert!(ensure_sufficient_balance(&account("A", dec!(30)), dec!(30)).is_ok());
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert_eq!(
            ensure_positive_amount(dec!(0)),
            Err(TransferError::InvalidAmount(dec!(0)))
        );
        assert_eq!(
            ensure_positive_amount(dec!(-5)),
            Err(TransferError::InvalidAmount(dec!(-5)))
        );
    }

    #[test]
    fn self_transfer_is_rejected() {
        let err = plan_fund_transfer(
            account("A", dec!(10)),
            account("A", dec!(10)),
            dec!(1),
            TransferId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, TransferError::SameAccount("A".to_string()));
    }

    #[test]
    fn utility_payment_emits_single_debit_with_reference() {
        let plan = plan_utility_payment(
            account("C", dec!(100.00)),
            dec!(20.00),
            "INV-2024-001",
            TransferId::new(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(plan.entries.len(), 1);
        let entry = &plan.entries[0];
        assert_eq!(entry.transaction_type, TransactionType::UtilityPayment);
        assert_eq!(entry.amount, dec!(-20.00));
        assert_eq!(entry.reference_number, "INV-2024-001");
        assert!(entry.is_debit());

        let c = &plan.accounts[0];
        assert_eq!(c.actual_balance(), dec!(80.00));
        assert_eq!(c.available_balance(), dec!(120.00));
    }

    #[test]
    fn utility_payment_checks_balance() {
        let err = plan_utility_payment(
            account("C", dec!(10)),
            dec!(20),
            "ref",
            TransferId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientBalance { .. }));
    }

    #[test]
    fn credit_that_loses_precision_rejects_the_whole_transfer() {
        let err = plan_fund_transfer(
            account("A", dec!(1)),
            account("B", dec!(10000000000000000000000000000)),
            dec!(0.01),
            TransferId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransferError::BalanceOverflow {
                account_number: "B".to_string(),
                amount: dec!(0.01),
            }
        );
    }

    #[test]
    fn credit_past_decimal_max_rejects_the_transfer() {
        let err = plan_fund_transfer(
            account("A", dec!(5)),
            account("B", Decimal::MAX),
            dec!(1),
            TransferId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, TransferError::BalanceOverflow { .. }));
    }

    #[test]
    fn utility_payment_overflowing_available_balance_is_rejected() {
        let hot = account("C", dec!(0)).with_balances(Decimal::MAX, dec!(100));
        let err = plan_utility_payment(hot, dec!(1), "ref", TransferId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, TransferError::BalanceOverflow { .. }));
    }

    fn cents() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000i64).prop_map(|c| Decimal::new(c, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a successful transfer conserves the combined actual balance
        /// and its two legs sum to zero.
        #[test]
        fn transfer_conserves_balance_and_legs_sum_to_zero(
            from_balance in cents(),
            to_balance in cents(),
            amount in cents(),
        ) {
            let before = from_balance + to_balance;
            let result = plan_fund_transfer(
                account("A", from_balance),
                account("B", to_balance),
                amount,
                TransferId::new(),
                Utc::now(),
            );

            if amount > from_balance {
                let rejected = matches!(result, Err(TransferError::InsufficientBalance { .. }));
                prop_assert!(rejected);
            } else {
                let plan = result.unwrap();
                let after: Decimal = plan.accounts.iter().map(|a| a.actual_balance()).sum();
                prop_assert_eq!(after, before);

                let legs: Decimal = plan.entries.iter().map(|e| e.amount).sum();
                prop_assert_eq!(legs, Decimal::ZERO);
                prop_assert!(plan.accounts[0].available_balance() >= Decimal::ZERO);
            }
        }
    }
}
