//! Batched counter allocator.
//!
//! The backend's atomic increment is globally ordered but throughput
//! limited; this allocator amortizes that cost by reserving a batch of
//! `batch_size` integers at a time and handing them out one at a time,
//! within a process, behind a single mutex.

use std::sync::Arc;

use parking_lot::Mutex;

use occkey_backend::KvBackend;
use occkey_core::types::OccurrenceKey;

use crate::error::CounterError;

struct Window {
    /// Last key already handed out.
    current_key: i64,
    /// Last key reserved from the backend (inclusive).
    max_reserved_key_inclusive: i64,
}

/// Reserves monotonic integer keys in batches and hands them out singly,
/// thread-safely, within a process.
///
/// Unused keys on process death are acceptable loss: the backend counter
/// only ever grows, so a restarted process simply reserves a fresh batch
/// starting after whatever was last persisted.
pub struct CounterAllocator {
    backend: Arc<dyn KvBackend>,
    batch_size: i64,
    window: Mutex<Window>,
}

impl CounterAllocator {
    /// Construct an allocator with both bounds of its reservation window at
    /// zero, so the first call to [`Self::next_key`] reserves a fresh batch.
    pub fn new(backend: Arc<dyn KvBackend>, batch_size: i64) -> Self {
        Self {
            backend,
            batch_size,
            window: Mutex::new(Window {
                current_key: 0,
                max_reserved_key_inclusive: 0,
            }),
        }
    }

    /// Allocate the next integer key.
    ///
    /// Reserves a fresh batch from the backend's atomic counter whenever the
    /// current window is exhausted. Fatal if the reserved maximum would not
    /// fit in a signed 32-bit integer.
    pub fn next_key(&self) -> Result<OccurrenceKey, CounterError> {
        let mut window = self.window.lock();

        if window.current_key == window.max_reserved_key_inclusive {
            let new_max = self.backend.increment_counter(self.batch_size)?;
            if new_max > i32::MAX as i64 {
                return Err(CounterError::Exhausted(new_max));
            }
            window.max_reserved_key_inclusive = new_max;
            window.current_key = new_max - self.batch_size;
        }

        window.current_key += 1;
        Ok(OccurrenceKey::new(window.current_key as i32))
    }
}
