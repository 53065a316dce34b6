//! Backend KV adapter abstraction.
//!
//! This crate is the only place backend specifics live: the lock engine,
//! counter allocator and coordinator are written entirely against
//! [`KvBackend`] and never know whether they are talking to an in-memory map
//! or a real wide-column store.
//!
//! The trait is specialized to the three logical tables this service needs
//! (lookup, counter, occurrence) rather than expressed as a fully generic
//! row/column/value store, because the column family layout for each table
//! is fixed — a generic adapter would just be this trait with an extra,
//! unused degree of freedom.

pub mod error;
pub mod in_memory;
pub mod row;

pub use error::BackendError;
pub use in_memory::InMemoryBackend;
pub use row::LookupRowSnapshot;

use occkey_core::types::{Lock, LockToken, OccurrenceKey};

/// The backend operations the lock engine, counter allocator and coordinator
/// require.
pub trait KvBackend: Send + Sync {
    /// Full-row read of a lookup row (`get(row)`).
    fn get_row(&self, row: &str) -> Result<Option<LookupRowSnapshot>, BackendError>;

    /// Read only the `key` column of a lookup row (`getColumn(row, "k")`).
    ///
    /// Used by the read-only `findKey` path, which never needs lock state.
    fn get_key(&self, row: &str) -> Result<Option<OccurrenceKey>, BackendError>;

    /// Unconditionally write the `key` column (`put(row, "k", value, ts)`).
    fn put_key(&self, row: &str, key: OccurrenceKey) -> Result<(), BackendError>;

    /// Unconditionally write `status = "ALLOCATED"` (`put(row, "status", ..)`).
    fn put_status_allocated(&self, row: &str) -> Result<(), BackendError>;

    /// Atomic compare-and-set on the `lock` column.
    ///
    /// `expected = None` means "must currently be absent". Succeeds iff the
    /// row's current lock token matches `expected` (or is absent, when
    /// `expected` is `None`), in which case `new` is written with a
    /// freshly-assigned timestamp.
    fn check_and_put_lock(
        &self,
        row: &str,
        new: LockToken,
        expected: Option<LockToken>,
    ) -> Result<bool, BackendError>;

    /// Delete the `lock` column (releases a held lock).
    fn delete_lock(&self, row: &str) -> Result<(), BackendError>;

    /// Atomically add `delta` to the counter table's well-known row and
    /// return the post-increment value.
    fn increment_counter(&self, delta: i64) -> Result<i64, BackendError>;

    /// Prefix-scan the lookup table, in row-key order, at the adapter's
    /// configured scan batch size.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, LookupRowSnapshot)>, BackendError>;

    /// Batch-delete whole lookup rows.
    fn delete_rows(&self, rows: &[String]) -> Result<(), BackendError>;

    /// Look up the dataset key recorded for an occurrence key, used by
    /// `delete_key` to resolve a scan prefix when no scope was supplied;
    /// absent this, `delete_key` falls back to a full-table scan.
    fn get_occurrence_dataset_key(
        &self,
        key: OccurrenceKey,
    ) -> Result<Option<String>, BackendError>;

    /// Record the dataset key for an occurrence key (test/demo fixture
    /// support; a real deployment populates the occurrence table from the
    /// surrounding ingest pipeline, not from this crate).
    fn put_occurrence_dataset_key(
        &self,
        key: OccurrenceKey,
        dataset_key: &str,
    ) -> Result<(), BackendError>;
}

pub(crate) fn lock_matches(current: Option<&Lock>, expected: Option<LockToken>) -> bool {
    match (current, expected) {
        (None, None) => true,
        (Some(lock), Some(token)) => lock.token == token,
        _ => false,
    }
}
