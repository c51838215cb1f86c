//! Ordered map and its enumerators.
//!
//! [`SequencedMap`] is the core container: a hash index over a sentinel ring
//! that records write order. The [`cursor`] module provides the borrowed
//! views returned by `keys()`/`values()`/`iter()` and the detached fail-fast
//! cursors that survive across mutable borrows.

pub mod cursor;
pub mod sequenced;

#[cfg(feature = "serde")]
mod serde_impl;

pub use cursor::{Cursor, EntryCursor, Iter, KeyCursor, Keys, ValueCursor, Values};
pub use sequenced::{IntoIter, SequencedMap, SyncRoot};
