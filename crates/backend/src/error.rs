//! Backend I/O failure type.
//!
//! Backend failures surface to the caller unchanged. The in-memory
//! reference backend can only fail if its internal mutex was poisoned by a
//! prior panic; a networked implementation would add connection/timeout
//! variants under the same enum.

use thiserror::Error;

/// A backend operation failure.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend's internal lock was poisoned by a panic in another thread.
    #[error("backend lock poisoned")]
    Poisoned,
}
