//! The allocation coordinator: composes the key builder, lock engine and
//! backend adapter into the five public entry points upstream collaborators
//! consume.

use std::collections::BTreeSet;
use std::sync::Arc;

use occkey_backend::KvBackend;
use occkey_concurrency::LockEngine;
use occkey_core::keys::LookupKeySet;
use occkey_core::types::{OccurrenceKey, Scope};

use crate::config::CoordinatorConfig;
use crate::error::Error;

/// Public entry points for occurrence key allocation.
///
/// Thread-safe: all mutable state (the counter allocator's reservation
/// window, inside [`LockEngine`]) is guarded by a mutex, and the backend is
/// a shared `Arc<dyn KvBackend>`.
pub struct AllocationCoordinator {
    backend: Arc<dyn KvBackend>,
    lock_engine: LockEngine,
    config: CoordinatorConfig,
}

impl AllocationCoordinator {
    /// Construct a coordinator over `backend` with the given configuration.
    pub fn new(backend: Arc<dyn KvBackend>, config: CoordinatorConfig) -> Self {
        let lock_engine = LockEngine::new(
            Arc::clone(&backend),
            config.batch_size,
            config.stale_lock_time,
            config.wait_before_retry,
            config.wait_skew,
        );
        Self {
            backend,
            lock_engine,
            config,
        }
    }

    fn resolve_scope(&self, scope: Option<&str>) -> Result<Scope, Error> {
        let raw = scope
            .map(str::to_string)
            .or_else(|| self.config.dataset_id.clone())
            .ok_or(Error::MissingScope)?;
        Ok(Scope::new(raw)?)
    }

    /// Allocate (or reuse) the integer key for `unique_strings` within
    /// `scope`, or the configured default scope if `scope` is `None`.
    ///
    /// Fails fatally if two derived lookup rows are already allocated to
    /// different keys; state is not mutated when that happens.
    pub fn generate_key<I, S>(
        &self,
        unique_strings: I,
        scope: Option<&str>,
    ) -> Result<(OccurrenceKey, bool), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scope = self.resolve_scope(scope)?;
        let keys = LookupKeySet::build(scope, unique_strings)?;
        Ok(self.lock_engine.generate_key(&keys)?)
    }

    /// [`Self::generate_key`] using the configured default scope.
    pub fn generate_key_default_scope<I, S>(
        &self,
        unique_strings: I,
    ) -> Result<(OccurrenceKey, bool), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.generate_key(unique_strings, None)
    }

    /// Read-only lookup: the allocated key for `unique_strings`, or `None`
    /// if no derived lookup row has one yet.
    ///
    /// Self-heals rows whose `key` column is missing (e.g. a torn write) by
    /// filling them in with the key agreed upon by the others. Fails fatally
    /// if two derived lookup rows disagree.
    pub fn find_key<I, S>(
        &self,
        unique_strings: I,
        scope: Option<&str>,
    ) -> Result<Option<OccurrenceKey>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scope = self.resolve_scope(scope)?;
        let keys = LookupKeySet::build(scope, unique_strings)?;

        let mut found: Option<OccurrenceKey> = None;
        let mut conflicts = std::collections::BTreeMap::new();
        let mut missing = Vec::new();

        for lookup_key in keys.keys() {
            let row = lookup_key.as_str();
            match self.backend.get_key(row)? {
                Some(key) => {
                    conflicts.insert(row.to_string(), key.value());
                    match found {
                        None => found = Some(key),
                        Some(expected) if expected != key => {
                            return Err(Error::FatalInconsistency { conflicts });
                        }
                        _ => {}
                    }
                }
                None => missing.push(row.to_string()),
            }
        }

        let Some(key) = found else {
            return Ok(None);
        };

        for row in missing {
            tracing::debug!(row, key = %key, "self-healing lookup row missing its key column");
            self.backend.put_key(&row, key)?;
        }

        Ok(Some(key))
    }

    /// [`Self::find_key`] using the configured default scope.
    pub fn find_key_default_scope<I, S>(
        &self,
        unique_strings: I,
    ) -> Result<Option<OccurrenceKey>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.find_key(unique_strings, None)
    }

    /// Every distinct allocated key under `scope`.
    pub fn find_keys_by_scope(&self, scope: Option<&str>) -> Result<BTreeSet<i32>, Error> {
        let scope = self.resolve_scope(scope)?;
        let rows = self.backend.scan_prefix(&scope.prefix())?;
        Ok(rows
            .into_iter()
            .filter_map(|(_, snapshot)| snapshot.key.map(|k| k.value()))
            .collect())
    }

    /// Delete every lookup row whose `key` column equals `occurrence_key`.
    ///
    /// Resolution order for the scan prefix: the supplied `scope`, then the
    /// configured default scope, then the occurrence table's recorded
    /// dataset key for `occurrence_key`. If none of those are available, a
    /// full-table scan is performed and a warning is emitted.
    pub fn delete_key(&self, occurrence_key: OccurrenceKey, scope: Option<&str>) -> Result<(), Error> {
        let resolved = match scope
            .map(str::to_string)
            .or_else(|| self.config.dataset_id.clone())
        {
            Some(raw) => Some(Scope::new(raw)?),
            None => self
                .backend
                .get_occurrence_dataset_key(occurrence_key)?
                .map(Scope::new)
                .transpose()?,
        };

        let prefix = match &resolved {
            Some(scope) => scope.prefix(),
            None => {
                tracing::warn!(
                    key = %occurrence_key,
                    "deleteKey: scope unknown, scanning the full lookup table"
                );
                String::new()
            }
        };

        let rows: Vec<String> = self
            .backend
            .scan_prefix(&prefix)?
            .into_iter()
            .filter(|(_, snapshot)| snapshot.key == Some(occurrence_key))
            .map(|(row, _)| row)
            .collect();

        self.backend.delete_rows(&rows)?;
        Ok(())
    }

    /// Delete exactly the lookup rows derived from `unique_strings`.
    pub fn delete_key_by_uniques<I, S>(
        &self,
        unique_strings: I,
        scope: Option<&str>,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scope = self.resolve_scope(scope)?;
        let keys = LookupKeySet::build(scope, unique_strings)?;
        let rows: Vec<String> = keys.keys().iter().map(|k| k.as_str().to_string()).collect();
        self.backend.delete_rows(&rows)?;
        Ok(())
    }
}
