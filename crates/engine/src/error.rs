//! Top-level error type surfaced by [`crate::coordinator::AllocationCoordinator`].

use std::collections::BTreeMap;

use occkey_backend::BackendError;
use occkey_concurrency::LockEngineError;
use occkey_core::error::KeyBuilderError;
use thiserror::Error;

/// Errors surfaced by the coordinator's public API.
#[derive(Debug, Error)]
pub enum Error {
    /// A backend operation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Invalid input to a key builder: a programming precondition violation.
    #[error(transparent)]
    InvalidArgument(#[from] KeyBuilderError),

    /// No scope was supplied and no default `dataset_id` is configured.
    #[error("no scope supplied and no default dataset_id configured")]
    MissingScope,

    /// Two or more of the supplied lookup keys disagree on their allocated
    /// integer key. State was not mutated.
    #[error("fatal inconsistency: conflicting allocated keys {conflicts:?}")]
    FatalInconsistency {
        /// Every conflicting lookup key observed, mapped to its recorded key.
        conflicts: BTreeMap<String, i32>,
    },

    /// The counter allocator could not reserve a new batch.
    #[error("counter exhausted: reserving a batch would reach {0}, which overflows a 32-bit key")]
    CounterExhausted(i64),
}

impl From<LockEngineError> for Error {
    fn from(err: LockEngineError) -> Self {
        match err {
            LockEngineError::Backend(e) => Error::Backend(e),
            LockEngineError::FatalInconsistency { conflicts } => {
                Error::FatalInconsistency { conflicts }
            }
            LockEngineError::CounterExhausted(v) => Error::CounterExhausted(v),
        }
    }
}
