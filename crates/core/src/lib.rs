//! Core types shared by the occurrence key allocation service.
//!
//! This crate defines the domain vocabulary used throughout the workspace:
//! - [`types`]: newtypes for scopes, lookup keys, lock tokens and occurrence keys.
//! - [`keys`]: the key builder that derives a canonical, order-stable set of
//!   lookup keys from a scope and a set of natural-key fragments.
//! - [`constants`]: the backend column/row names and tunable defaults from
//!   the external interface contract. Changing these breaks compatibility
//!   with existing deployments.
//! - [`error`]: the precondition-violation error surfaced by the key builder.

pub mod constants;
pub mod error;
pub mod keys;
pub mod types;

pub use error::KeyBuilderError;
pub use keys::LookupKeySet;
pub use types::{LockToken, LookupKey, OccurrenceKey, Scope};
