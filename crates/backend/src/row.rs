//! The backend-agnostic shape of a lookup row.

use occkey_core::types::{Lock, OccurrenceKey};

/// A snapshot of a lookup row's three columns, as read from a backend.
///
/// `status` is only ever explicitly `"ALLOCATED"`; the ALLOCATING state is
/// inferred from `lock.is_some() && !allocated`, and FREE from everything
/// being absent.
#[derive(Debug, Clone, Default)]
pub struct LookupRowSnapshot {
    /// The held lock, if any.
    pub lock: Option<Lock>,
    /// The occurrence key, if one has been written.
    pub key: Option<OccurrenceKey>,
    /// Whether `status = "ALLOCATED"` has been written.
    pub allocated: bool,
}

impl LookupRowSnapshot {
    /// The row exists but carries none of the three columns.
    pub fn is_free(&self) -> bool {
        self.lock.is_none() && !self.allocated
    }
}
