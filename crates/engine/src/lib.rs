//! Allocation coordinator: the public entry points this service exposes to
//! upstream collaborators. Everything below the coordinator API (the lock
//! protocol, the counter allocator, the backend adapter) is internal.

pub mod config;
pub mod coordinator;
pub mod error;

pub use config::CoordinatorConfig;
pub use coordinator::AllocationCoordinator;
pub use error::Error;
