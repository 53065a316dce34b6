//! # occkey
//!
//! A distributed occurrence key allocation service: given one or more natural
//! keys known to identify the same logical record, allocates (or reuses) a
//! single small integer "occurrence key" for that record, coordinating
//! concurrent callers through an optimistic lock protocol over a wide-column
//! store.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use occkey::{AllocationCoordinator, CoordinatorConfig, InMemoryBackend};
//!
//! let coordinator = AllocationCoordinator::new(
//!     Arc::new(InMemoryBackend::new()),
//!     CoordinatorConfig::new().with_dataset_id("articles"),
//! );
//!
//! let (key, created) = coordinator
//!     .generate_key_default_scope(["ic|cc|cat1"])
//!     .unwrap();
//! assert!(created);
//!
//! // A second, overlapping natural-key set converges on the same key.
//! let (same_key, created) = coordinator
//!     .generate_key_default_scope(["ic|cc|cat1", "occ-42"])
//!     .unwrap();
//! assert_eq!(key, same_key);
//! assert!(!created);
//! ```
//!
//! # Architecture
//!
//! | Crate | Responsibility |
//! |-------|----------------|
//! | `occkey-core` | Domain vocabulary: scopes, lookup keys, occurrence keys, the key builder. |
//! | `occkey-backend` | The [`KvBackend`] adapter trait and an in-memory reference implementation. |
//! | `occkey-concurrency` | The lock protocol engine and batched counter allocator. |
//! | `occkey-engine` | [`AllocationCoordinator`], the public API this crate re-exports. |
//!
//! Only [`AllocationCoordinator`] and the types needed to construct and call
//! it are re-exported here; the lock protocol and counter allocator are
//! internal to the service.

pub use occkey_backend::{BackendError, InMemoryBackend, KvBackend, LookupRowSnapshot};
pub use occkey_core::types::{LockToken, LookupKey, OccurrenceKey, Scope};
pub use occkey_core::KeyBuilderError;
pub use occkey_engine::{AllocationCoordinator, CoordinatorConfig, Error};
