//! Lock protocol engine and counter allocator.
//!
//! This crate implements the hard part of the service: the per-lookup-key
//! ALLOCATING→ALLOCATED state machine with stale-lock
//! takeover and retry-on-conflict ([`lock_engine::LockEngine`]), and the
//! batched monotonic counter it allocates fresh integers from
//! ([`counter::CounterAllocator`]).

pub mod backoff;
pub mod counter;
pub mod error;
pub mod lock_engine;

pub use counter::CounterAllocator;
pub use error::{CounterError, LockEngineError};
pub use lock_engine::LockEngine;
