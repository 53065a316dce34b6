//! Backend column/row names and tunable defaults.
//!
//! These are part of the persisted state layout and are compatibility
//! critical: renaming or re-encoding any of them changes how existing
//! deployments' lookup rows are read.

use std::time::Duration;

/// Lock column name within the lookup table's column family.
pub const LOCK_COLUMN: &str = "lock";

/// Key column name. Integer keys are stored big-endian, 4 bytes wide.
pub const KEY_COLUMN: &str = "k";

/// Status column name. The only value ever written is `STATUS_ALLOCATED`;
/// absence of the column means "not allocated" (FREE or HELD).
pub const STATUS_COLUMN: &str = "status";

/// The single value ever written to [`STATUS_COLUMN`].
pub const STATUS_ALLOCATED: &str = "ALLOCATED";

/// Row key of the counter table's single well-known row.
pub const COUNTER_ROW: i64 = 1;

/// Column name of the counter table's atomic integer column.
pub const COUNTER_COLUMN: &str = "counter";

/// Default batch size for the counter allocator's reservation window.
pub const BATCH_SIZE: i64 = 100;

/// Default base retry delay for lock-acquisition conflicts.
pub const WAIT_BEFORE_RETRY: Duration = Duration::from_millis(5000);

/// Default jitter window added to (or subtracted from) [`WAIT_BEFORE_RETRY`].
pub const WAIT_SKEW: Duration = Duration::from_millis(4000);

/// Default age after which a held lock is considered stale and may be
/// taken over by another writer.
pub const STALE_LOCK_TIME: Duration = Duration::from_millis(300_000);

/// Default scan batch size used by prefix scans (`findKeysByScope`, `deleteKey`).
pub const CLIENT_CACHING: usize = 200;
