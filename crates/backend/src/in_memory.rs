//! In-memory reference backend.
//!
//! Used by the coordinator's unit and property tests and by the demo CLI.
//! This is explicitly not a production HBase/Bigtable client: its single
//! global mutex trades all parallelism for simplicity, since the property
//! under test here is the *protocol*, not backend throughput.

use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;

use parking_lot::Mutex;

use occkey_core::types::{Lock, LockToken, OccurrenceKey};

use crate::error::BackendError;
use crate::row::LookupRowSnapshot;
use crate::{lock_matches, KvBackend};

#[derive(Debug, Clone, Default)]
struct RowState {
    lock: Option<Lock>,
    key: Option<OccurrenceKey>,
    allocated: bool,
}

impl From<&RowState> for LookupRowSnapshot {
    fn from(row: &RowState) -> Self {
        LookupRowSnapshot {
            lock: row.lock,
            key: row.key,
            allocated: row.allocated,
        }
    }
}

/// An in-memory [`KvBackend`] backed by a single mutex-guarded `BTreeMap`.
pub struct InMemoryBackend {
    rows: Mutex<BTreeMap<String, RowState>>,
    counter: Mutex<i64>,
    occurrences: Mutex<HashMap<i32, String>>,
}

impl InMemoryBackend {
    /// Construct an empty backend with the counter at zero.
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            counter: Mutex::new(0),
            occurrences: Mutex::new(HashMap::new()),
        }
    }

    /// Test-only fault injection: back-date a row's lock timestamp, so
    /// staleness tests don't have to sleep for the real `STALE_LOCK_TIME`.
    ///
    /// Panics if `row` has no held lock.
    pub fn force_lock_timestamp(&self, row: &str, acquired_at: SystemTime) {
        let mut rows = self.rows.lock();
        let state = rows.get_mut(row).expect("row must exist and hold a lock");
        let lock = state.lock.as_mut().expect("row must hold a lock");
        lock.acquired_at = acquired_at;
    }

    /// Test-only fault injection: corrupt a row's `key` column, simulating a
    /// torn write, without touching `status` or `lock`.
    pub fn corrupt_key(&self, row: &str, key: Option<OccurrenceKey>) {
        let mut rows = self.rows.lock();
        rows.entry(row.to_string()).or_default().key = key;
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KvBackend for InMemoryBackend {
    fn get_row(&self, row: &str) -> Result<Option<LookupRowSnapshot>, BackendError> {
        let rows = self.rows.lock();
        Ok(rows.get(row).map(LookupRowSnapshot::from))
    }

    fn get_key(&self, row: &str) -> Result<Option<OccurrenceKey>, BackendError> {
        let rows = self.rows.lock();
        Ok(rows.get(row).and_then(|r| r.key))
    }

    fn put_key(&self, row: &str, key: OccurrenceKey) -> Result<(), BackendError> {
        let mut rows = self.rows.lock();
        rows.entry(row.to_string()).or_default().key = Some(key);
        Ok(())
    }

    fn put_status_allocated(&self, row: &str) -> Result<(), BackendError> {
        let mut rows = self.rows.lock();
        rows.entry(row.to_string()).or_default().allocated = true;
        Ok(())
    }

    fn check_and_put_lock(
        &self,
        row: &str,
        new: LockToken,
        expected: Option<LockToken>,
    ) -> Result<bool, BackendError> {
        let mut rows = self.rows.lock();
        let state = rows.entry(row.to_string()).or_default();
        if !lock_matches(state.lock.as_ref(), expected) {
            return Ok(false);
        }
        state.lock = Some(Lock {
            token: new,
            acquired_at: SystemTime::now(),
        });
        Ok(true)
    }

    fn delete_lock(&self, row: &str) -> Result<(), BackendError> {
        let mut rows = self.rows.lock();
        if let Some(state) = rows.get_mut(row) {
            state.lock = None;
        }
        Ok(())
    }

    fn increment_counter(&self, delta: i64) -> Result<i64, BackendError> {
        let mut counter = self.counter.lock();
        *counter += delta;
        Ok(*counter)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, LookupRowSnapshot)>, BackendError> {
        let rows = self.rows.lock();
        Ok(rows
            .range(prefix.to_string()..)
            .take_while(|(row, _)| row.starts_with(prefix))
            .map(|(row, state)| (row.clone(), LookupRowSnapshot::from(state)))
            .collect())
    }

    fn delete_rows(&self, rows_to_delete: &[String]) -> Result<(), BackendError> {
        let mut rows = self.rows.lock();
        for row in rows_to_delete {
            rows.remove(row);
        }
        Ok(())
    }

    fn get_occurrence_dataset_key(
        &self,
        key: OccurrenceKey,
    ) -> Result<Option<String>, BackendError> {
        let occurrences = self.occurrences.lock();
        Ok(occurrences.get(&key.value()).cloned())
    }

    fn put_occurrence_dataset_key(
        &self,
        key: OccurrenceKey,
        dataset_key: &str,
    ) -> Result<(), BackendError> {
        let mut occurrences = self.occurrences.lock();
        occurrences.insert(key.value(), dataset_key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_and_put_lock_requires_absence_by_default() {
        let backend = InMemoryBackend::new();
        let token = LockToken::generate();
        assert!(backend.check_and_put_lock("row", token, None).unwrap());
        // Second caller with expected=None must fail: lock is now held.
        let other = LockToken::generate();
        assert!(!backend.check_and_put_lock("row", other, None).unwrap());
    }

    #[test]
    fn check_and_put_lock_takes_over_with_matching_expected() {
        let backend = InMemoryBackend::new();
        let old = LockToken::generate();
        backend.check_and_put_lock("row", old, None).unwrap();
        let new = LockToken::generate();
        assert!(backend
            .check_and_put_lock("row", new, Some(old))
            .unwrap());
        let lock = backend.get_row("row").unwrap().unwrap().lock.unwrap();
        assert_eq!(lock.token, new);
    }

    #[test]
    fn delete_lock_clears_only_the_lock_column() {
        let backend = InMemoryBackend::new();
        backend.put_key("row", OccurrenceKey::new(7)).unwrap();
        backend
            .check_and_put_lock("row", LockToken::generate(), None)
            .unwrap();
        backend.delete_lock("row").unwrap();
        let snapshot = backend.get_row("row").unwrap().unwrap();
        assert!(snapshot.lock.is_none());
        assert_eq!(snapshot.key, Some(OccurrenceKey::new(7)));
    }

    #[test]
    fn increment_counter_is_monotonic_and_reflects_delta() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.increment_counter(100).unwrap(), 100);
        assert_eq!(backend.increment_counter(100).unwrap(), 200);
    }

    #[test]
    fn scan_prefix_returns_only_matching_rows_in_order() {
        let backend = InMemoryBackend::new();
        backend.put_key("ds1|a", OccurrenceKey::new(1)).unwrap();
        backend.put_key("ds1|b", OccurrenceKey::new(2)).unwrap();
        backend.put_key("ds2|a", OccurrenceKey::new(3)).unwrap();
        let scanned = backend.scan_prefix("ds1|").unwrap();
        let rows: Vec<&str> = scanned.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(rows, vec!["ds1|a", "ds1|b"]);
    }

    #[test]
    fn delete_rows_removes_exactly_the_named_rows() {
        let backend = InMemoryBackend::new();
        backend.put_key("a", OccurrenceKey::new(1)).unwrap();
        backend.put_key("b", OccurrenceKey::new(2)).unwrap();
        backend.delete_rows(&["a".to_string()]).unwrap();
        assert!(backend.get_row("a").unwrap().is_none());
        assert!(backend.get_row("b").unwrap().is_some());
    }
}
