use std::collections::HashMap;
use std::sync::RwLock;

use ledgerline_core::TransferId;
use ledgerline_ledger::TransactionEntry;

use super::r#trait::{TransactionLog, TransactionLogError};

#[derive(Debug, Default)]
struct LogState {
    entries: Vec<TransactionEntry>,
    by_transfer: HashMap<TransferId, Vec<usize>>,
    by_account: HashMap<String, Vec<usize>>,
}

impl LogState {
    fn collect(&self, positions: Option<&Vec<usize>>) -> Vec<TransactionEntry> {
        positions
            .map(|idx| idx.iter().map(|&i| self.entries[i].clone()).collect())
            .unwrap_or_default()
    }
}

/// In-memory append-only transaction log.
///
/// Intended for tests/dev. Entries live in a single vector indexed by
/// transfer id and by owning account.
#[derive(Debug, Default)]
pub struct InMemoryTransactionLog {
    state: RwLock<LogState>,
}

impl InMemoryTransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries appended so far.
    pub fn len(&self) -> Result<usize, TransactionLogError> {
        self.state
            .read()
            .map(|s| s.entries.len())
            .map_err(|_| TransactionLogError::Unavailable("lock poisoned".to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, TransactionLogError> {
        Ok(self.len()? == 0)
    }
}

impl TransactionLog for InMemoryTransactionLog {
    fn append(&self, entries: Vec<TransactionEntry>) -> Result<(), TransactionLogError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| TransactionLogError::Unavailable("lock poisoned".to_string()))?;

        // Validate the whole batch before touching state.
        let mut batch_ids: Vec<TransferId> = entries.iter().map(|e| e.transaction_id).collect();
        batch_ids.sort();
        batch_ids.dedup();
        if let Some(seen) = batch_ids.iter().find(|id| state.by_transfer.contains_key(*id)) {
            return Err(TransactionLogError::DuplicateTransfer(*seen));
        }
        if let Some(idx) = entries.iter().position(|e| e.account_number.is_empty()) {
            return Err(TransactionLogError::InvalidAppend(format!(
                "entry at index {idx} has no owning account"
            )));
        }

        for entry in entries {
            let pos = state.entries.len();
            state
                .by_transfer
                .entry(entry.transaction_id)
                .or_default()
                .push(pos);
            state
                .by_account
                .entry(entry.account_number.clone())
                .or_default()
                .push(pos);
            state.entries.push(entry);
        }

        Ok(())
    }

    fn find_by_transaction_id(
        &self,
        transaction_id: TransferId,
    ) -> Result<Vec<TransactionEntry>, TransactionLogError> {
        let state = self
            .state
            .read()
            .map_err(|_| TransactionLogError::Unavailable("lock poisoned".to_string()))?;

        Ok(state.collect(state.by_transfer.get(&transaction_id)))
    }

    fn find_by_account(
        &self,
        account_number: &str,
    ) -> Result<Vec<TransactionEntry>, TransactionLogError> {
        let state = self
            .state
            .read()
            .map_err(|_| TransactionLogError::Unavailable("lock poisoned".to_string()))?;

        Ok(state.collect(state.by_account.get(account_number)))
    }
}
