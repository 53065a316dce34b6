//! Newtypes for the domain vocabulary.
//!
//! Using distinct types for a scope, a lookup key and an occurrence key
//! (instead of passing bare `String`/`i32` around) gives the key builder and
//! the lock engine a typed seam, so a caller can't accidentally pass a raw
//! natural-key fragment where a scope is expected.

use std::fmt;
use std::time::SystemTime;

use byteorder::{BigEndian, ByteOrder};

use crate::error::KeyBuilderError;

/// A namespace prefix for lookup keys, typically a dataset identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scope(String);

impl Scope {
    /// Construct a scope, rejecting empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Result<Self, KeyBuilderError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(KeyBuilderError::EmptyScope);
        }
        Ok(Self(raw))
    }

    /// The scope-prefix helper `"{scope}|"` used by prefix scans.
    pub fn prefix(&self) -> String {
        format!("{}|", self.0)
    }

    /// Borrow the raw scope string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A canonical lookup-table row key: `"{scope}|{fragment}"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    pub(crate) fn new(scope: &Scope, fragment: &str) -> Self {
        Self(format!("{}|{}", scope.as_str(), fragment))
    }

    /// Borrow the row key as a string slice, for use against a backend.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LookupKey> for String {
    fn from(key: LookupKey) -> Self {
        key.0
    }
}

/// An opaque lock token: 16 random bytes, no textual format assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockToken([u8; 16]);

impl LockToken {
    /// Generate a fresh token with overwhelming odds of global uniqueness.
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Reconstruct a token from raw bytes (e.g. read back from a backend).
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// A held lock: its token and the backend-assigned timestamp it was written
/// at. Staleness is judged against this timestamp, never a client clock.
#[derive(Debug, Clone, Copy)]
pub struct Lock {
    /// The lock token identifying the attempt that acquired it.
    pub token: LockToken,
    /// The backend's cell-assigned timestamp for the lock write.
    pub acquired_at: SystemTime,
}

impl Lock {
    /// Whether this lock is still live (not older than `stale_after`) as of `now`.
    pub fn is_stale(&self, now: SystemTime, stale_after: std::time::Duration) -> bool {
        now.duration_since(self.acquired_at)
            .map(|age| age > stale_after)
            .unwrap_or(false)
    }
}

/// The stable integer key allocated to an occurrence record.
///
/// Must fit in a signed 32-bit integer; the counter table's value is a
/// wider integer so that exhaustion can be detected before it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OccurrenceKey(i32);

impl OccurrenceKey {
    /// Construct directly from an already-validated `i32`.
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// The raw integer value.
    pub fn value(&self) -> i32 {
        self.0
    }

    /// Decode from the big-endian 4-byte wire encoding used by the `k` column.
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(BigEndian::read_i32(&bytes))
    }

    /// Encode to the big-endian 4-byte wire encoding used by the `k` column.
    pub fn to_be_bytes(self) -> [u8; 4] {
        let mut buf = [0u8; 4];
        BigEndian::write_i32(&mut buf, self.0);
        buf
    }
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
