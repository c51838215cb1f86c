//! Error types for the seqcache library.
//!
//! ## Key Components
//!
//! - [`ConcurrentModificationError`]: Returned by a cursor when the map it
//!   walks was structurally modified after the cursor was created. This is the
//!   only error a map operation can produce at run time.
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//! - [`ConfigError`]: Returned when builder parameters are inconsistent.
//!
//! Lookups and removals of absent keys are not errors; they return `None`.
//!
//! ## Example Usage
//!
//! ```
//! use seqcache::error::ConcurrentModificationError;
//! use seqcache::map::SequencedMap;
//!
//! let mut map = SequencedMap::new();
//! map.set("a", 1);
//!
//! let mut keys = map.key_cursor();
//! map.set("b", 2);
//!
//! let err: ConcurrentModificationError = keys.next(&map).unwrap_err();
//! assert_eq!(err.expected(), 1);
//! assert_eq!(err.found(), 2);
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConcurrentModificationError
// ---------------------------------------------------------------------------

/// Error returned when a map changes underneath an active cursor.
///
/// Carries the revision the cursor captured and the revision the map had when
/// the cursor tried to advance. The cursor cannot recover; create a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrentModificationError {
    expected: u64,
    found: u64,
}

impl ConcurrentModificationError {
    /// Creates a new error for a cursor armed at `expected` that observed `found`.
    #[inline]
    pub fn new(expected: u64, found: u64) -> Self {
        Self { expected, found }
    }

    /// Revision captured when the cursor was created.
    #[inline]
    pub fn expected(&self) -> u64 {
        self.expected
    }

    /// Revision of the map at the failed advance.
    #[inline]
    pub fn found(&self) -> u64 {
        self.found
    }
}

impl fmt::Display for ConcurrentModificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collection was modified during iteration (expected revision {}, found {})",
            self.expected, self.found
        )
    }
}

impl std::error::Error for ConcurrentModificationError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal map invariants are violated.
///
/// Produced by `check_invariants` on [`SentinelRing`](crate::ds::SentinelRing),
/// [`SequencedMap`](crate::map::SequencedMap) and
/// [`LruMap`](crate::policy::lru::LruMap). Carries a human-readable
/// description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when map configuration parameters are invalid.
///
/// Produced by [`MapBuilder::try_build_lru`](crate::builder::MapBuilder::try_build_lru).
///
/// # Example
///
/// ```
/// use seqcache::builder::MapBuilder;
///
/// let err = MapBuilder::new()
///     .maximum_size(4)
///     .initial_capacity(64)
///     .try_build_lru::<u64, u64>()
///     .unwrap_err();
/// assert!(err.to_string().contains("initial_capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConcurrentModificationError --------------------------------------

    #[test]
    fn concurrent_modification_display_names_revisions() {
        let err = ConcurrentModificationError::new(3, 5);
        let msg = err.to_string();
        assert!(msg.contains("modified during iteration"));
        assert!(msg.contains('3'));
        assert!(msg.contains('5'));
    }

    #[test]
    fn concurrent_modification_accessors() {
        let err = ConcurrentModificationError::new(7, 9);
        assert_eq!(err.expected(), 7);
        assert_eq!(err.found(), 9);
        assert_eq!(err, err.clone());
    }

    #[test]
    fn concurrent_modification_implements_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ConcurrentModificationError>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("index length mismatch");
        assert_eq!(err.to_string(), "index length mismatch");
        assert_eq!(err.message(), "index length mismatch");
    }

    #[test]
    fn invariant_debug_includes_message() {
        let err = InvariantError::new("bad link");
        assert!(format!("{:?}", err).contains("bad link"));
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("initial_capacity exceeds maximum_size");
        assert_eq!(err.to_string(), "initial_capacity exceeds maximum_size");
        assert_eq!(err.message(), "initial_capacity exceeds maximum_size");
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
