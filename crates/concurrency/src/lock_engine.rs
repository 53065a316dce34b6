//! The ALLOCATING→ALLOCATED lock protocol.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use occkey_backend::KvBackend;
use occkey_core::keys::LookupKeySet;
use occkey_core::types::{LockToken, OccurrenceKey};

use crate::backoff::jittered_delay;
use crate::counter::CounterAllocator;
use crate::error::LockEngineError;

/// Outcome of a single (non-retried) allocation attempt.
enum Attempt {
    /// The attempt resolved a key, with `bool` set iff a fresh integer was
    /// allocated rather than an existing one reused.
    Success(OccurrenceKey, bool),
    /// A lock-acquisition conflict occurred; the caller should back off and
    /// retry a fresh attempt.
    Conflict,
}

/// Implements the allocation algorithm over a [`KvBackend`].
pub struct LockEngine {
    backend: Arc<dyn KvBackend>,
    counter: CounterAllocator,
    stale_lock_time: Duration,
    wait_before_retry: Duration,
    wait_skew: Duration,
}

impl LockEngine {
    /// Construct a lock engine with the given tunables.
    pub fn new(
        backend: Arc<dyn KvBackend>,
        batch_size: i64,
        stale_lock_time: Duration,
        wait_before_retry: Duration,
        wait_skew: Duration,
    ) -> Self {
        Self {
            counter: CounterAllocator::new(Arc::clone(&backend), batch_size),
            backend,
            stale_lock_time,
            wait_before_retry,
            wait_skew,
        }
    }

    /// Allocate (or reuse) the integer key for `keys`, retrying on protocol
    /// conflict with randomized backoff until an attempt succeeds or a
    /// non-retriable error occurs. Expressed as an explicit loop, never
    /// recursion.
    pub fn generate_key(
        &self,
        keys: &LookupKeySet,
    ) -> Result<(OccurrenceKey, bool), LockEngineError> {
        loop {
            match self.attempt(keys)? {
                Attempt::Success(key, created) => return Ok((key, created)),
                Attempt::Conflict => {
                    let delay = jittered_delay(self.wait_before_retry, self.wait_skew);
                    tracing::debug!(?delay, "lock acquisition conflict, retrying after backoff");
                    std::thread::sleep(delay);
                }
            }
        }
    }

    fn attempt(&self, keys: &LookupKeySet) -> Result<Attempt, LockEngineError> {
        let lock_id = LockToken::generate();
        let now = SystemTime::now();

        let mut found_key: Option<OccurrenceKey> = None;
        let mut existing_key_map: BTreeMap<String, i32> = BTreeMap::new();
        let mut acquired: Vec<String> = Vec::new();

        for lookup_key in keys.keys() {
            let row = lookup_key.as_str();
            let snapshot = self.backend.get_row(row)?.unwrap_or_default();

            if snapshot.allocated {
                let existing = snapshot
                    .key
                    .expect("invariant 1: an ALLOCATED row always carries a key");
                existing_key_map.insert(row.to_string(), existing.value());

                match found_key {
                    None => found_key = Some(existing),
                    Some(expected) if expected != existing => {
                        self.release(&acquired);
                        tracing::error!(
                            conflicts = ?existing_key_map,
                            "fatal inconsistency: natural-key set resolves to multiple keys"
                        );
                        return Err(LockEngineError::FatalInconsistency {
                            conflicts: existing_key_map,
                        });
                    }
                    _ => {}
                }
                continue;
            }

            let acquired_this_key = match snapshot.lock {
                None => self.backend.check_and_put_lock(row, lock_id, None)?,
                Some(lock) if lock.is_stale(now, self.stale_lock_time) => {
                    tracing::debug!(row, "taking over stale lock");
                    self.backend
                        .check_and_put_lock(row, lock_id, Some(lock.token))?
                }
                Some(_) => false,
            };

            if acquired_this_key {
                acquired.push(row.to_string());
            } else {
                self.release(&acquired);
                return Ok(Attempt::Conflict);
            }
        }

        let (key, created) = match found_key {
            Some(key) => (key, false),
            None => (self.counter.next_key()?, true),
        };

        // Ordering matters: `key` before `status`, so no observer ever sees
        // ALLOCATED without a key.
        for row in &acquired {
            self.backend.put_key(row, key)?;
            self.backend.put_status_allocated(row)?;
        }
        self.release(&acquired);

        Ok(Attempt::Success(key, created))
    }

    fn release(&self, rows: &[String]) {
        for row in rows {
            if let Err(err) = self.backend.delete_lock(row) {
                tracing::warn!(row, %err, "failed to release lock on best effort");
            }
        }
    }
}
