use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use ledgerline_core::{AggregateRoot, ExpectedVersion, TransferId, UserId};
use ledgerline_ledger::{Account, TransactionEntry};

use super::r#trait::{LedgerStore, LedgerStoreError};
use crate::transaction_log::TransactionLog;

type AccountCell = Arc<Mutex<Account>>;

/// In-memory ledger store with per-account optimistic versioning.
///
/// Each account lives behind its own mutex; the outer map lock is only held
/// long enough to look records up. An atomic update locks the records it
/// touches in account-number order, so overlapping batches serialize without
/// deadlocking and disjoint batches proceed in parallel.
///
/// Intended for tests/dev.
#[derive(Debug)]
pub struct InMemoryLedgerStore<L> {
    accounts: RwLock<HashMap<String, AccountCell>>,
    log: L,
}

impl<L> InMemoryLedgerStore<L>
where
    L: TransactionLog,
{
    pub fn new(log: L) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            log,
        }
    }

    /// Transaction log written by this store.
    pub fn log(&self) -> &L {
        &self.log
    }

    fn cell(&self, account_number: &str) -> Result<Option<AccountCell>, LedgerStoreError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| LedgerStoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(accounts.get(account_number).cloned())
    }
}

fn lock(cell: &AccountCell) -> Result<MutexGuard<'_, Account>, LedgerStoreError> {
    cell.lock()
        .map_err(|_| LedgerStoreError::Unavailable("account lock poisoned".to_string()))
}

/// Checks batch shape and returns the shared transfer id plus the accounts in lock order.
fn validate_batch(
    accounts: Vec<Account>,
    entries: &[TransactionEntry],
) -> Result<(TransferId, BTreeMap<String, Account>), LedgerStoreError> {
    let Some(first) = entries.first() else {
        return Err(LedgerStoreError::InvalidUpdate(
            "batch must contain at least one entry".to_string(),
        ));
    };
    let transfer_id = first.transaction_id;

    let mut ordered = BTreeMap::new();
    for account in accounts {
        let number = account.account_number().to_string();
        if ordered.insert(number.clone(), account).is_some() {
            return Err(LedgerStoreError::InvalidUpdate(format!(
                "account {number} submitted twice"
            )));
        }
    }

    for (idx, e) in entries.iter().enumerate() {
        if e.transaction_id != transfer_id {
            return Err(LedgerStoreError::InvalidUpdate(format!(
                "batch contains multiple transfer ids (index {idx})"
            )));
        }
        if !ordered.contains_key(&e.account_number) {
            return Err(LedgerStoreError::InvalidUpdate(format!(
                "entry at index {idx} belongs to account {} which is not part of the update",
                e.account_number
            )));
        }
    }

    Ok((transfer_id, ordered))
}

impl<L> LedgerStore for InMemoryLedgerStore<L>
where
    L: TransactionLog,
{
    fn get_account(&self, account_number: &str) -> Result<Option<Account>, LedgerStoreError> {
        match self.cell(account_number)? {
            Some(cell) => {
                let account = lock(&cell)?.clone();
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    fn atomic_update(
        &self,
        accounts: Vec<Account>,
        entries: Vec<TransactionEntry>,
    ) -> Result<TransferId, LedgerStoreError> {
        let (transfer_id, ordered) = validate_batch(accounts, &entries)?;

        // Resolve every record first; the map lock is released before locking accounts.
        let mut cells = Vec::with_capacity(ordered.len());
        for number in ordered.keys() {
            let cell = self
                .cell(number)?
                .ok_or_else(|| LedgerStoreError::UnknownAccount(number.clone()))?;
            cells.push(cell);
        }

        // Lock in account-number order (BTreeMap iteration order).
        let mut guards = Vec::with_capacity(cells.len());
        for cell in &cells {
            guards.push(lock(cell)?);
        }

        for (guard, submitted) in guards.iter().zip(ordered.values()) {
            if guard.account_id() != submitted.account_id() {
                return Err(LedgerStoreError::InvalidUpdate(format!(
                    "account {} does not match the stored record",
                    submitted.account_number()
                )));
            }
            let expected = ExpectedVersion(submitted.version());
            if !expected.matches(guard.version()) {
                return Err(LedgerStoreError::Conflict(format!(
                    "account {}: expected {expected:?}, found {}",
                    submitted.account_number(),
                    guard.version()
                )));
            }
        }

        // Log first: if it refuses the entries no balance has been touched yet.
        self.log.append(entries)?;

        for (guard, submitted) in guards.iter_mut().zip(ordered.into_values()) {
            let next = guard.version() + 1;
            **guard = submitted.with_version(next);
        }

        Ok(transfer_id)
    }

    fn open_account(&self, account: Account) -> Result<(), LedgerStoreError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| LedgerStoreError::Unavailable("lock poisoned".to_string()))?;

        let number = account.account_number().to_string();
        if accounts.contains_key(&number) {
            return Err(LedgerStoreError::DuplicateAccount(number));
        }
        accounts.insert(number, Arc::new(Mutex::new(account.with_version(0))));
        Ok(())
    }

    fn accounts_for_owner(&self, owner: UserId) -> Result<Vec<Account>, LedgerStoreError> {
        let cells: Vec<AccountCell> = {
            let accounts = self
                .accounts
                .read()
                .map_err(|_| LedgerStoreError::Unavailable("lock poisoned".to_string()))?;
            accounts.values().cloned().collect()
        };

        let mut owned = Vec::new();
        for cell in &cells {
            let account = lock(cell)?;
            if account.owner() == owner {
                owned.push(account.clone());
            }
        }
        owned.sort_by(|a, b| a.account_number().cmp(b.account_number()));
        Ok(owned)
    }
}
