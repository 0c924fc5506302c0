//! Local wiring of the ledger engine against in-memory collaborators.
//!
//! Seeds two customer accounts and one utility provider, runs a fund transfer
//! and a utility payment, and prints the resulting ledger entries as JSON.

use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;

use ledgerline_core::UserId;
use ledgerline_infra::{
    EngineConfig, InMemoryLedgerStore, InMemoryProviderRegistry, InMemoryTransactionLog,
    LedgerStore, ProviderAccount, TransferEngine,
};
use ledgerline_ledger::{Account, AccountType};

fn main() -> anyhow::Result<()> {
    ledgerline_observability::init();

    let config = EngineConfig::from_env().context("invalid LEDGER_* configuration")?;
    tracing::info!(max_attempts = config.retry.max_attempts, "starting ledger engine");

    let log = Arc::new(InMemoryTransactionLog::new());
    let store = Arc::new(InMemoryLedgerStore::new(log.clone()));
    let providers = InMemoryProviderRegistry::new().with_provider(ProviderAccount {
        provider_id: "ELEC-01".to_string(),
        provider_name: "City Power".to_string(),
        account_number: "0900001".to_string(),
    });

    let owner = UserId::new();
    store.open_account(Account::open("0600141", AccountType::Savings, owner, Decimal::new(10_000, 2)))?;
    store.open_account(Account::open("0600142", AccountType::Checking, owner, Decimal::ZERO))?;

    let engine = TransferEngine::new(store.clone(), log, providers, config);

    let transfer = engine.fund_transfer("0600141", "0600142", Decimal::new(3_000, 2))?;
    let payment = engine.utility_payment("0600141", "ELEC-01", Decimal::new(2_000, 2), "BILL-2024-10")?;

    let report = serde_json::json!({
        "fund_transfer": transfer,
        "fund_transfer_legs": engine.transfer_details(transfer.transfer_id)?,
        "utility_payment": payment,
        "accounts": store.accounts_for_owner(owner)?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
