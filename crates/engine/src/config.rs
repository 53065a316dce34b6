//! Coordinator configuration.

use std::time::Duration;

use occkey_core::constants;

/// Configuration for an [`crate::coordinator::AllocationCoordinator`].
///
/// `lookup_table`, `counter_table`, `occurrence_table` and `column_family`
/// are logical names carried through for parity with the service's external
/// interface; a real backend implementation would route to the right table
/// using them. The in-memory reference backend has only one row space per
/// logical table and ignores them.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Logical name of the lookup table.
    pub lookup_table: String,
    /// Logical name of the counter table.
    pub counter_table: String,
    /// Logical name of the occurrence table.
    pub occurrence_table: String,
    /// Column family shared by all three tables.
    pub column_family: String,
    /// Default scope used when a caller omits one.
    pub dataset_id: Option<String>,
    /// Counter reservation batch size.
    pub batch_size: i64,
    /// Base retry delay on lock-acquisition conflict.
    pub wait_before_retry: Duration,
    /// Jitter window added to (or subtracted from) `wait_before_retry`.
    pub wait_skew: Duration,
    /// Age after which a held lock is considered stale.
    pub stale_lock_time: Duration,
    /// Scan batch size for prefix scans.
    pub client_caching: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            lookup_table: "occurrence_lookup".to_string(),
            counter_table: "occurrence_counter".to_string(),
            occurrence_table: "occurrence".to_string(),
            column_family: "o".to_string(),
            dataset_id: None,
            batch_size: constants::BATCH_SIZE,
            wait_before_retry: constants::WAIT_BEFORE_RETRY,
            wait_skew: constants::WAIT_SKEW,
            stale_lock_time: constants::STALE_LOCK_TIME,
            client_caching: constants::CLIENT_CACHING,
        }
    }
}

impl CoordinatorConfig {
    /// Start from the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default scope (builder pattern).
    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    /// Set the counter reservation batch size (builder pattern).
    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the base retry delay (builder pattern).
    pub fn with_wait_before_retry(mut self, wait_before_retry: Duration) -> Self {
        self.wait_before_retry = wait_before_retry;
        self
    }

    /// Set the retry jitter window (builder pattern).
    pub fn with_wait_skew(mut self, wait_skew: Duration) -> Self {
        self.wait_skew = wait_skew;
        self
    }

    /// Set the stale-lock age threshold (builder pattern).
    pub fn with_stale_lock_time(mut self, stale_lock_time: Duration) -> Self {
        self.stale_lock_time = stale_lock_time;
        self
    }

    /// Set the prefix-scan batch size (builder pattern).
    pub fn with_client_caching(mut self, client_caching: usize) -> Self {
        self.client_caching = client_caching;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.wait_before_retry, Duration::from_millis(5000));
        assert_eq!(config.wait_skew, Duration::from_millis(4000));
        assert_eq!(config.stale_lock_time, Duration::from_millis(300_000));
        assert_eq!(config.client_caching, 200);
        assert!(config.dataset_id.is_none());
    }

    #[test]
    fn builder_overrides_compose() {
        let config = CoordinatorConfig::new()
            .with_dataset_id("ds1")
            .with_batch_size(10);
        assert_eq!(config.dataset_id.as_deref(), Some("ds1"));
        assert_eq!(config.batch_size, 10);
    }
}
