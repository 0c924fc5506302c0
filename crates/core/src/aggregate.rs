//! Aggregate root trait for versioned ledger records.

/// Aggregate root marker + minimal interface.
///
/// Ledger records are not event-sourced: the store keeps the latest state and
/// a version counter that advances by one on every committed write.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Version of the state this value was read at.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation: the version a writer read its record at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedVersion(pub u64);

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        self.0 == actual
    }
}
