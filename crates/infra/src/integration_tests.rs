//! Integration tests for the full transfer pipeline.
//!
//! Tests: TransferEngine → LedgerStore → TransactionLog
//!
//! Verifies:
//! - Committed transfers update balances and the log together
//! - Rejected transfers leave both untouched
//! - Concurrent transfers on a shared account never overdraw it

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use ledgerline_core::{AggregateRoot, TransferError, UserId};
    use ledgerline_ledger::{Account, AccountType};

    use crate::config::{EngineConfig, RetryPolicy};
    use crate::ledger_store::{InMemoryLedgerStore, LedgerStore};
    use crate::provider::{InMemoryProviderRegistry, ProviderAccount};
    use crate::transaction_log::{InMemoryTransactionLog, TransactionLog};
    use crate::transfer_engine::TransferEngine;

    type Log = Arc<InMemoryTransactionLog>;
    type Store = Arc<InMemoryLedgerStore<Log>>;
    type Engine = TransferEngine<Store, Log, InMemoryProviderRegistry>;

    fn setup_with(config: EngineConfig) -> (Arc<Engine>, Store, Log) {
        let log: Log = Arc::new(InMemoryTransactionLog::new());
        let store: Store = Arc::new(InMemoryLedgerStore::new(log.clone()));
        let providers = InMemoryProviderRegistry::new().with_provider(ProviderAccount {
            provider_id: "WATER-02".to_string(),
            provider_name: "Metro Water".to_string(),
            account_number: "0900002".to_string(),
        });
        let engine = Arc::new(TransferEngine::new(
            store.clone(),
            log.clone(),
            providers,
            config,
        ));
        (engine, store, log)
    }

    fn setup() -> (Arc<Engine>, Store, Log) {
        setup_with(EngineConfig::default())
    }

    fn open(store: &Store, number: &str, balance: Decimal) {
        store
            .open_account(Account::open(number, AccountType::Savings, UserId::new(), balance))
            .unwrap();
    }

    fn balances(store: &Store, number: &str) -> (Decimal, Decimal) {
        let account = store.get_account(number).unwrap().unwrap();
        (account.available_balance(), account.actual_balance())
    }

    #[test]
    fn transfer_of_thirty_from_hundred() {
        let (engine, store, log) = setup();
        open(&store, "A", dec!(100.00));
        open(&store, "B", dec!(12.50));

        let receipt = engine.fund_transfer("A", "B", dec!(30.00)).unwrap();

        assert_eq!(balances(&store, "A"), (dec!(70.00), dec!(70.00)));
        assert_eq!(balances(&store, "B"), (dec!(42.50), dec!(42.50)));

        let legs = log.find_by_transaction_id(receipt.transfer_id).unwrap();
        let mut amounts: Vec<Decimal> = legs.iter().map(|e| e.amount).collect();
        amounts.sort();
        assert_eq!(amounts, vec![dec!(-30.00), dec!(30.00)]);
        assert!(legs.iter().all(|e| e.transaction_id == receipt.transfer_id));
    }

    #[test]
    fn transfer_of_eighty_from_fifty_writes_nothing() {
        let (engine, store, log) = setup();
        open(&store, "A", dec!(50.00));
        open(&store, "B", dec!(0.00));

        let err = engine.fund_transfer("A", "B", dec!(80.00)).unwrap_err();
        assert!(matches!(err, TransferError::InsufficientBalance { .. }));

        assert_eq!(balances(&store, "A"), (dec!(50.00), dec!(50.00)));
        assert_eq!(balances(&store, "B"), (dec!(0.00), dec!(0.00)));
        assert!(log.is_empty().unwrap());
    }

    #[test]
    fn missing_destination_writes_nothing_to_source() {
        let (engine, store, log) = setup();
        open(&store, "A", dec!(50.00));

        let err = engine.fund_transfer("A", "NOPE", dec!(10.00)).unwrap_err();
        assert_eq!(err, TransferError::AccountNotFound("NOPE".to_string()));
        assert_eq!(balances(&store, "A"), (dec!(50.00), dec!(50.00)));
        assert_eq!(store.get_account("A").unwrap().unwrap().version(), 0);
        assert!(log.is_empty().unwrap());
    }

    #[test]
    fn utility_payment_of_twenty() {
        let (engine, store, log) = setup();
        open(&store, "C", dec!(100.00));

        let receipt = engine
            .utility_payment("C", "WATER-02", dec!(20.00), "WB-2231-09")
            .unwrap();

        let entries = log.find_by_account("C").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].transaction_id, receipt.transfer_id);
        assert_eq!(entries[0].amount, dec!(-20.00));
        assert_eq!(entries[0].reference_number, "WB-2231-09");
        assert_eq!(store.get_account("C").unwrap().unwrap().actual_balance(), dec!(80.00));
        assert!(log.find_by_account("0900002").unwrap().is_empty());
    }

    #[test]
    fn concurrent_transfers_from_one_source_never_overdraw() {
        let (engine, store, log) = setup_with(
            EngineConfig::default().with_retry(RetryPolicy {
                max_attempts: 64,
                ..RetryPolicy::default()
            }),
        );
        open(&store, "SRC", dec!(100.00));
        let destinations: Vec<String> = (0..8).map(|i| format!("DST-{i}")).collect();
        for number in &destinations {
            open(&store, number, dec!(0));
        }

        // Eight transfers of 30.00 against 100.00: exactly three can succeed.
        let barrier = Arc::new(Barrier::new(destinations.len()));
        let handles: Vec<_> = destinations
            .iter()
            .cloned()
            .map(|to| {
                let engine = engine.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    engine.fund_transfer("SRC", &to, dec!(30.00))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 3);
        assert!(results.iter().all(|r| match r {
            Ok(_) => true,
            Err(e) => matches!(e, TransferError::InsufficientBalance { .. }),
        }));

        assert_eq!(balances(&store, "SRC"), (dec!(10.00), dec!(10.00)));
        let credited: Decimal = destinations
            .iter()
            .map(|number| balances(&store, number).1)
            .sum();
        assert_eq!(credited, dec!(90.00));
        assert_eq!(log.len().unwrap(), 6);
        assert_eq!(log.find_by_account("SRC").unwrap().len(), 3);
    }

    #[test]
    fn concurrent_transfers_on_disjoint_pairs_all_commit() {
        let (engine, store, log) = setup();
        for i in 0..6 {
            open(&store, &format!("FROM-{i}"), dec!(10));
            open(&store, &format!("TO-{i}"), dec!(0));
        }

        let barrier = Arc::new(Barrier::new(6));
        let handles: Vec<_> = (0..6)
            .map(|i| {
                let engine = engine.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    engine.fund_transfer(&format!("FROM-{i}"), &format!("TO-{i}"), dec!(10))
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        for i in 0..6 {
            assert_eq!(balances(&store, &format!("FROM-{i}")).1, dec!(0));
            assert_eq!(balances(&store, &format!("TO-{i}")).1, dec!(10));
        }
        assert_eq!(log.len().unwrap(), 12);
    }

    #[test]
    fn crossing_transfers_conserve_total_balance() {
        let (engine, store, _log) = setup_with(EngineConfig::default().with_max_attempts(64));
        open(&store, "P", dec!(500.00));
        open(&store, "Q", dec!(500.00));

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let engine = engine.clone();
                thread::spawn(move || {
                    let (from, to) = if i % 2 == 0 { ("P", "Q") } else { ("Q", "P") };
                    engine.fund_transfer(from, to, dec!(7.25))
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let total = balances(&store, "P").1 + balances(&store, "Q").1;
        assert_eq!(total, dec!(1000.00));
        assert_eq!(balances(&store, "P"), (dec!(500.00), dec!(500.00)));
    }
}
