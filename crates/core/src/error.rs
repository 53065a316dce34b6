//! Precondition-violation errors raised while building lookup keys.
//!
//! These are programming precondition violations: they are fatal and are
//! never retried.

use thiserror::Error;

/// Errors raised constructing a [`crate::types::Scope`] or
/// [`crate::keys::LookupKeySet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyBuilderError {
    /// A scope was empty or whitespace-only.
    #[error("scope must not be empty")]
    EmptyScope,

    /// After dropping empty fragments, no lookup keys remained.
    #[error("at least one non-empty unique-string fragment is required")]
    NoFragments,
}
