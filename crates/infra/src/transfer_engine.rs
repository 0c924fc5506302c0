//! Transfer execution pipeline (application-level orchestration).
//!
//! ## Execution Flow
//!
//! ```text
//! Request
//!   ↓
//! 1. Validate amount (no IO)
//!   ↓
//! 2. Read participating accounts from the ledger store (fresh, versioned)
//!   ↓
//! 3. Plan: validate accounts and balances, compute new state + ledger entries (pure)
//!   ↓
//! 4. Commit accounts and entries through `LedgerStore::atomic_update`
//!   ↓
//! 5. On `Conflict`, back off and restart from step 2
//! ```
//!
//! The engine holds no locks of its own. `atomic_update` is the only
//! synchronization point, so an abandoned request before step 4 leaves no trace.

use std::thread;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use ledgerline_core::{TransferError, TransferId, TransferResult};
use ledgerline_ledger::{
    Account, FundTransfer, LedgerMutation, TransactionEntry, TransferReceipt, UtilityPayment,
    ensure_positive_amount, ensure_sufficient_balance,
    plan_fund_transfer, plan_utility_payment, FUND_TRANSFER_MESSAGE, UTILITY_PAYMENT_MESSAGE,
};

use crate::config::EngineConfig;
use crate::ledger_store::{LedgerStore, LedgerStoreError};
use crate::provider::ProviderResolver;
use crate::transaction_log::TransactionLog;

/// Validates and executes fund transfers and utility payments.
///
/// ## Error Semantics
///
/// - **Validation**: `InvalidAmount`, `AccountNotFound`, `SameAccount`, `ProviderNotFound`,
///   `InsufficientBalance`, `BalanceOverflow` surface on the first attempt, with nothing written
/// - **Contention**: write conflicts are retried from a fresh read; once the retry
///   budget is spent the caller gets `Contention`
/// - **Store**: any other store/log failure is returned as `Store`
///
/// Retrying a request at the caller creates a new transfer; there is no
/// request-level deduplication.
///
/// ## Generic Parameters
///
/// - `S`: ledger store (`InMemoryLedgerStore` in tests)
/// - `L`: transaction log used for audit reads (the same log the store appends to)
/// - `P`: utility provider resolver
#[derive(Debug)]
pub struct TransferEngine<S, L, P> {
    store: S,
    log: L,
    providers: P,
    config: EngineConfig,
}

impl<S, L, P> TransferEngine<S, L, P> {
    pub fn new(store: S, log: L, providers: P, config: EngineConfig) -> Self {
        Self {
            store,
            log,
            providers,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_parts(self) -> (S, L, P) {
        (self.store, self.log, self.providers)
    }
}

impl<S, L, P> TransferEngine<S, L, P>
where
    S: LedgerStore,
    L: TransactionLog,
    P: ProviderResolver,
{
    /// Move `amount` from one account to another as a single two-leg transfer.
    #[instrument(skip_all, fields(from = %from_account_number, to = %to_account_number, %amount), err)]
    pub fn fund_transfer(
        &self,
        from_account_number: &str,
        to_account_number: &str,
        amount: Decimal,
    ) -> TransferResult<TransferReceipt> {
        ensure_positive_amount(amount)?;

        let transfer_id = self.commit_with_retry(|| {
            let from = self.load(from_account_number)?;
            let to = self.load(to_account_number)?;
            plan_fund_transfer(from, to, amount, TransferId::new(), Utc::now())
        })?;

        info!(%transfer_id, "fund transfer committed");
        Ok(TransferReceipt {
            transfer_id,
            message: FUND_TRANSFER_MESSAGE.to_string(),
        })
    }

    /// Pay `amount` from an account to a utility provider.
    ///
    /// The provider lookup only gates the payment; no entry is written to the
    /// provider's account.
    #[instrument(skip_all, fields(account = %account_number, provider = %provider_id, %amount), err)]
    pub fn utility_payment(
        &self,
        account_number: &str,
        provider_id: &str,
        amount: Decimal,
        reference_number: &str,
    ) -> TransferResult<TransferReceipt> {
        ensure_positive_amount(amount)?;

        let transfer_id = self.commit_with_retry(|| {
            let account = self.load(account_number)?;
            ensure_sufficient_balance(&account, amount)?;
            let provider = self.providers.resolve(provider_id)?;
            debug!(provider_account = %provider.account_number, "utility provider resolved");
            plan_utility_payment(account, amount, reference_number, TransferId::new(), Utc::now())
        })?;

        info!(%transfer_id, "utility payment committed");
        Ok(TransferReceipt {
            transfer_id,
            message: UTILITY_PAYMENT_MESSAGE.to_string(),
        })
    }

    pub fn execute_fund_transfer(&self, request: &FundTransfer) -> TransferResult<TransferReceipt> {
        self.fund_transfer(
            &request.from_account_number,
            &request.to_account_number,
            request.amount,
        )
    }

    pub fn execute_utility_payment(
        &self,
        request: &UtilityPayment,
    ) -> TransferResult<TransferReceipt> {
        self.utility_payment(
            &request.account_number,
            &request.provider_id,
            request.amount,
            &request.reference_number,
        )
    }

    /// All legs recorded under a transfer id.
    pub fn transfer_details(&self, transfer_id: TransferId) -> TransferResult<Vec<TransactionEntry>> {
        let entries = self
            .log
            .find_by_transaction_id(transfer_id)
            .map_err(|e| TransferError::store(e.to_string()))?;

        if entries.is_empty() {
            return Err(TransferError::TransferNotFound(transfer_id.to_string()));
        }
        Ok(entries)
    }

    /// Ledger history of one account, oldest first.
    pub fn account_transactions(&self, account_number: &str) -> TransferResult<Vec<TransactionEntry>> {
        self.load(account_number)?;
        self.log
            .find_by_account(account_number)
            .map_err(|e| TransferError::store(e.to_string()))
    }

    pub fn account(&self, account_number: &str) -> TransferResult<Account> {
        self.load(account_number)
    }

    fn load(&self, account_number: &str) -> TransferResult<Account> {
        self.store
            .get_account(account_number)?
            .ok_or_else(|| TransferError::account_not_found(account_number))
    }

    /// Run read-plan-commit until it commits, a non-conflict error occurs, or
    /// the retry budget is spent.
    fn commit_with_retry(
        &self,
        mut plan: impl FnMut() -> TransferResult<LedgerMutation>,
    ) -> TransferResult<TransferId> {
        let max_attempts = self.config.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let mutation = plan().inspect_err(|e| debug!(attempt, error = %e, "transfer rejected"))?;

            match self.store.atomic_update(mutation.accounts, mutation.entries) {
                Ok(transfer_id) => return Ok(transfer_id),
                Err(LedgerStoreError::Conflict(reason)) => {
                    warn!(attempt, max_attempts, %reason, "ledger write conflict");
                    if attempt < max_attempts {
                        thread::sleep(self.config.retry.delay_for_attempt(attempt));
                    }
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(TransferError::Contention {
            attempts: max_attempts,
        })
    }
}
