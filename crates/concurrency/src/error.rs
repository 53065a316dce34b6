//! Error types for the counter allocator and lock engine.

use std::collections::BTreeMap;

use occkey_backend::BackendError;
use thiserror::Error;

/// Errors from [`crate::counter::CounterAllocator::next_key`].
#[derive(Debug, Error)]
pub enum CounterError {
    /// The backend increment itself failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The counter's post-increment value would not fit in a signed 32-bit
    /// integer. Non-retriable.
    #[error("counter exhausted: reserving a batch would reach {0}, which overflows a 32-bit key")]
    Exhausted(i64),
}

/// Errors from [`crate::lock_engine::LockEngine::generate_key`].
///
/// Protocol conflicts are never represented here: the engine retries them
/// internally and only returns once an attempt succeeds or a non-retriable
/// error occurs.
#[derive(Debug, Error)]
pub enum LockEngineError {
    /// A backend operation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Two or more of the supplied lookup keys are already `ALLOCATED` with
    /// different integer keys. Non-retriable; no state was mutated by this
    /// attempt.
    #[error("fatal inconsistency: conflicting allocated keys {conflicts:?}")]
    FatalInconsistency {
        /// Every `ALLOCATED` lookup key observed during the attempt that
        /// produced the conflict, mapped to its recorded integer key.
        conflicts: BTreeMap<String, i32>,
    },

    /// The counter allocator could not reserve a new batch.
    #[error("counter exhausted: reserving a batch would reach {0}, which overflows a 32-bit key")]
    CounterExhausted(i64),
}

impl From<CounterError> for LockEngineError {
    fn from(err: CounterError) -> Self {
        match err {
            CounterError::Backend(e) => LockEngineError::Backend(e),
            CounterError::Exhausted(v) => LockEngineError::CounterExhausted(v),
        }
    }
}
