//! Ordered views and fail-fast cursors over a [`SequencedMap`].
//!
//! There are two ways to walk a map, oldest entry first:
//!
//! - **Borrowed views** ([`Keys`], [`Values`], [`Iter`]) are ordinary
//!   iterators holding `&SequencedMap`. The borrow already rules out any
//!   mutation while they live, so they never fail.
//! - **Detached cursors** ([`Cursor`]) hold no borrow. They remember a ring
//!   position plus the map revision they were created at, and take the map as
//!   an argument on every step. If the map was structurally modified in
//!   between, the step fails with [`ConcurrentModificationError`].
//!
//! Both are one type parameterized by a [`Projection`] that picks what each
//! step yields: the key ([`KeyView`]), the value ([`ValueView`]) or the pair
//! ([`EntryView`]).
//!
//! ```text
//!   cursor created at revision 4
//!       │
//!       ▼
//!   [sentinel] ─► [A] ─► [B] ─► [C] ─► [sentinel]
//!                  ▲
//!            position after one step
//!
//!   map.set(..)        revision 5
//!   cursor.next(&map)  -> Err(expected 4, found 5)
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::ds::ring::RingIter;
use crate::ds::slot_arena::SlotId;
use crate::error::ConcurrentModificationError;
use crate::map::sequenced::SequencedMap;

/// Chooses what a view or cursor yields for each entry.
pub trait Projection<K, V> {
    type Item<'a>
    where
        K: 'a,
        V: 'a;

    fn project<'a>(key: &'a K, value: &'a V) -> Self::Item<'a>;
}

/// Yields `&K`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyView;

/// Yields `&V`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueView;

/// Yields `(&K, &V)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryView;

impl<K, V> Projection<K, V> for KeyView {
    type Item<'a>
        = &'a K
    where
        K: 'a,
        V: 'a;

    #[inline]
    fn project<'a>(key: &'a K, _value: &'a V) -> Self::Item<'a> {
        key
    }
}

impl<K, V> Projection<K, V> for ValueView {
    type Item<'a>
        = &'a V
    where
        K: 'a,
        V: 'a;

    #[inline]
    fn project<'a>(_key: &'a K, value: &'a V) -> Self::Item<'a> {
        value
    }
}

impl<K, V> Projection<K, V> for EntryView {
    type Item<'a>
        = (&'a K, &'a V)
    where
        K: 'a,
        V: 'a;

    #[inline]
    fn project<'a>(key: &'a K, value: &'a V) -> Self::Item<'a> {
        (key, value)
    }
}

// ---------------------------------------------------------------------------
// Borrowed views
// ---------------------------------------------------------------------------

/// Borrowed view over a map in sequence order.
pub struct View<'a, K, V, P> {
    inner: RingIter<'a, K, V>,
    _projection: PhantomData<fn() -> P>,
}

/// Keys in sequence order. Created by [`SequencedMap::keys`].
pub type Keys<'a, K, V> = View<'a, K, V, KeyView>;

/// Values in sequence order. Created by [`SequencedMap::values`].
pub type Values<'a, K, V> = View<'a, K, V, ValueView>;

/// `(key, value)` pairs in sequence order. Created by [`SequencedMap::iter`].
pub type Iter<'a, K, V> = View<'a, K, V, EntryView>;

impl<'a, K, V, P> View<'a, K, V, P> {
    pub(crate) fn new(inner: RingIter<'a, K, V>) -> Self {
        Self {
            inner,
            _projection: PhantomData,
        }
    }
}

impl<'a, K, V, P> Iterator for View<'a, K, V, P>
where
    P: Projection<K, V>,
{
    type Item = P::Item<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, k, v)| P::project(k, v))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, P: Projection<K, V>> ExactSizeIterator for View<'_, K, V, P> {}

impl<K, V, P: Projection<K, V>> FusedIterator for View<'_, K, V, P> {}

// ---------------------------------------------------------------------------
// Detached cursors
// ---------------------------------------------------------------------------

/// Fail-fast cursor that does not borrow the map it walks.
///
/// The cursor starts before the first (oldest) entry. Every call to
/// [`next`](Self::next) or [`move_next`](Self::move_next) first compares the
/// map's current revision with the one captured at creation and fails if they
/// differ. Once invalidated, a cursor stays invalid: [`reset`](Self::reset)
/// rewinds the position but keeps the captured revision.
///
/// Cursors may be advanced through anything that exposes the underlying
/// [`SequencedMap`] via `AsRef`, including [`LruMap`](crate::policy::lru::LruMap).
///
/// # Example
///
/// ```
/// use seqcache::map::SequencedMap;
///
/// let mut map = SequencedMap::new();
/// map.set("a", 1);
/// map.set("b", 2);
///
/// let mut values = map.value_cursor();
/// assert_eq!(values.next(&map), Ok(Some(&1)));
/// assert_eq!(values.next(&map), Ok(Some(&2)));
/// assert_eq!(values.next(&map), Ok(None));
///
/// values.reset();
/// assert_eq!(values.next(&map), Ok(Some(&1)));
///
/// map.remove(&"a");
/// assert!(values.next(&map).is_err());
/// ```
pub struct Cursor<P> {
    start: SlotId,
    position: SlotId,
    revision: u64,
    _projection: PhantomData<fn() -> P>,
}

/// Cursor yielding keys. Created by [`SequencedMap::key_cursor`].
pub type KeyCursor = Cursor<KeyView>;

/// Cursor yielding values. Created by [`SequencedMap::value_cursor`].
pub type ValueCursor = Cursor<ValueView>;

/// Cursor yielding `(key, value)` pairs. Created by [`SequencedMap::cursor`].
pub type EntryCursor = Cursor<EntryView>;

impl<P> Cursor<P> {
    pub(crate) fn new(sentinel: SlotId, revision: u64) -> Self {
        Self {
            start: sentinel,
            position: sentinel,
            revision,
            _projection: PhantomData,
        }
    }

    /// Revision of the map when this cursor was created.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Rewinds to the position before the first entry.
    pub fn reset(&mut self) {
        self.position = self.start;
    }

    fn check<K, V>(&self, map: &SequencedMap<K, V>) -> Result<(), ConcurrentModificationError> {
        let found = map.revision();
        if found == self.revision {
            return Ok(());
        }
        map.note_cursor_invalidated();
        tracing::debug!(
            expected = self.revision,
            found,
            "cursor advanced over a modified map"
        );
        Err(ConcurrentModificationError::new(self.revision, found))
    }

    /// Advances one entry. Returns `Ok(false)` once the end is reached.
    pub fn move_next<K, V, M>(&mut self, map: &M) -> Result<bool, ConcurrentModificationError>
    where
        M: AsRef<SequencedMap<K, V>> + ?Sized,
    {
        let map = map.as_ref();
        self.check(map)?;
        let ring = map.ring();
        match ring.next_id(self.position) {
            Some(next) if next != ring.sentinel() => {
                self.position = next;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    /// Advances one entry and returns its projection, `Ok(None)` at the end.
    pub fn next<'m, K, V, M>(
        &mut self,
        map: &'m M,
    ) -> Result<Option<P::Item<'m>>, ConcurrentModificationError>
    where
        M: AsRef<SequencedMap<K, V>> + ?Sized,
        P: Projection<K, V>,
        K: 'm,
        V: 'm,
    {
        if !self.move_next::<K, V, M>(map)? {
            return Ok(None);
        }
        Ok(self.current::<K, V, M>(map))
    }

    /// Projection of the entry under the cursor, `None` before the first step
    /// or after the entry vanished.
    pub fn current<'m, K, V, M>(&self, map: &'m M) -> Option<P::Item<'m>>
    where
        M: AsRef<SequencedMap<K, V>> + ?Sized,
        P: Projection<K, V>,
        K: 'm,
        V: 'm,
    {
        map.as_ref()
            .ring()
            .entry(self.position)
            .map(|(k, v)| P::project(k, v))
    }
}

impl<P> Clone for Cursor<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Cursor<P> {}

impl<P> fmt::Debug for Cursor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
