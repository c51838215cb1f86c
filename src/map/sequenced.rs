//! # Sequenced Hash Map
//!
//! A hash map that remembers the order in which its entries were last
//! written. Lookups, inserts, updates and removals are O(1); walking the map
//! visits entries from the oldest write to the newest.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        SequencedMap<K, V>                            │
//!   │                                                                      │
//!   │   index: FxHashMap<K, SlotId>          revision: u64                 │
//!   │   ┌─────────┬────────┐                 (bumped on every structural   │
//!   │   │   Key   │ SlotId │                  mutation)                    │
//!   │   ├─────────┼────────┤                                               │
//!   │   │   "a"   │  id_1 ─┼──────┐                                        │
//!   │   │   "b"   │  id_2 ─┼──┐   │                                        │
//!   │   └─────────┴────────┘  │   │                                        │
//!   │                         ▼   ▼                                        │
//!   │   ring: SentinelRing<K, V>                                           │
//!   │     [sentinel] ◄──► [a] ◄──► [b] ◄──► [sentinel]                     │
//!   │                     oldest   newest                                  │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//!
//! New keys are linked at the newest end. Writing to an existing key also
//! relinks it at the newest end, so the sequence is "most recently written"
//! order rather than pure insertion order:
//!
//! ```text
//!   set(a, 1)  set(b, 2)  set(a, 3)   ==>   b, a
//! ```
//!
//! ## Revision
//!
//! `revision()` increases by exactly one on every `set`, on every `remove` or
//! `pop_first` that found an entry, on every successful `touch`, and on every
//! `clear` (even of an empty map). Detached [`Cursor`]s compare against it on
//! every step.
//!
//! ## Thread Safety
//!
//! The map performs no locking. [`sync_root`](SequencedMap::sync_root)
//! hands out a per-instance mutex that callers may use to serialize compound
//! operations themselves.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::ops::Index;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::ring::SentinelRing;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;
use crate::map::cursor::{Cursor, EntryCursor, Iter, KeyCursor, Keys, ValueCursor, Values, View};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::SequencedMapMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::SequencedMapMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    MetricsSnapshotProvider, SequencedMetricsReadRecorder, SequencedMetricsRecorder,
};

/// Lock handed out by [`SequencedMap::sync_root`].
pub type SyncRoot = Arc<Mutex<()>>;

/// Insertion-ordered hash map with most-recently-written ordering.
///
/// # Example
///
/// ```
/// use seqcache::map::SequencedMap;
///
/// let mut map = SequencedMap::new();
/// map.set("a", 1);
/// map.set("b", 2);
/// map.set("a", 3);
///
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["b", "a"]);
/// assert_eq!(map.first_key(), Some(&"b"));
/// assert_eq!(map.last_value(), Some(&3));
/// assert_eq!(map.to_string(), "[b=2,a=3]");
/// ```
pub struct SequencedMap<K, V> {
    index: FxHashMap<K, SlotId>,
    ring: SentinelRing<K, V>,
    revision: u64,
    sync_root: SyncRoot,
    #[cfg(feature = "metrics")]
    metrics: SequencedMapMetrics,
}

impl<K, V> SequencedMap<K, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ring: SentinelRing::with_capacity(capacity),
            revision: 0,
            sync_root: Arc::new(Mutex::new(())),
            #[cfg(feature = "metrics")]
            metrics: SequencedMapMetrics::default(),
        }
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current structural revision.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Always `false`: the map does no internal locking.
    #[inline]
    pub fn is_synchronized(&self) -> bool {
        false
    }

    /// Per-instance lock for callers that coordinate access themselves.
    ///
    /// ```
    /// use seqcache::map::SequencedMap;
    ///
    /// let mut map = SequencedMap::new();
    /// let root = map.sync_root();
    /// {
    ///     let _guard = root.lock();
    ///     map.set(1, "one");
    ///     map.set(2, "two");
    /// }
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn sync_root(&self) -> SyncRoot {
        Arc::clone(&self.sync_root)
    }

    /// Oldest entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.ring.front()
    }

    /// Newest entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.ring.back()
    }

    pub fn first_key(&self) -> Option<&K> {
        self.first().map(|(k, _)| k)
    }

    pub fn first_value(&self) -> Option<&V> {
        self.first().map(|(_, v)| v)
    }

    pub fn last_key(&self) -> Option<&K> {
        self.last().map(|(k, _)| k)
    }

    pub fn last_value(&self) -> Option<&V> {
        self.last().map(|(_, v)| v)
    }

    /// Returns `true` if any entry holds a value equal to `value`. O(n).
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Keys, oldest first.
    pub fn keys(&self) -> Keys<'_, K, V> {
        View::new(self.ring.iter())
    }

    /// Values, oldest first.
    pub fn values(&self) -> Values<'_, K, V> {
        View::new(self.ring.iter())
    }

    /// `(key, value)` pairs, oldest first.
    pub fn iter(&self) -> Iter<'_, K, V> {
        View::new(self.ring.iter())
    }

    /// Detached fail-fast cursor over `(key, value)` pairs.
    pub fn cursor(&self) -> EntryCursor {
        self.new_cursor()
    }

    /// Detached fail-fast cursor over keys.
    pub fn key_cursor(&self) -> KeyCursor {
        self.new_cursor()
    }

    /// Detached fail-fast cursor over values.
    pub fn value_cursor(&self) -> ValueCursor {
        self.new_cursor()
    }

    fn new_cursor<P>(&self) -> Cursor<P> {
        #[cfg(feature = "metrics")]
        self.metrics.record_cursor_created();
        Cursor::new(self.ring.sentinel(), self.revision)
    }

    /// Drops every entry. Always bumps the revision.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.bump_revision();
        self.index.clear();
        self.ring.clear();
    }

    #[inline]
    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub(crate) fn ring(&self) -> &SentinelRing<K, V> {
        &self.ring
    }

    pub(crate) fn note_cursor_invalidated(&self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_cursor_invalidated();
    }
}

impl<K, V> SequencedMap<K, V>
where
    K: Eq + Hash,
{
    /// Looks up `key` without changing the order.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.ring.entry(id).map(|(_, v)| v)
    }

    /// Mutable access to the value of `key`.
    ///
    /// Editing a value in place is not a structural change: order and revision
    /// stay as they are.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.ring.value_mut(id)
    }

    /// Looks up the stored key and value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.ring.entry(id)
    }

    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Alias for [`contains_key`](Self::contains_key).
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.contains_key(key)
    }

    /// Removes `key` and returns its value. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key` and returns the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.index.remove(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_remove_missing();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();

        self.bump_revision();
        self.ring.remove(id)
    }

    /// Removes and returns the oldest entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let (key, value) = self.ring.pop_front()?;
        self.index.remove(&key);
        self.bump_revision();

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();

        Some((key, value))
    }

    /// Relinks `key` at the newest position without changing its value.
    ///
    /// Returns `false` (and leaves the revision alone) if `key` is absent.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&id) = self.index.get(key) else {
            return false;
        };
        self.ring.move_to_back(id);
        self.bump_revision();

        #[cfg(feature = "metrics")]
        self.metrics.record_touch();

        true
    }

    /// Touches `key` and returns its value in one lookup.
    pub(crate) fn touch_get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.touch(key) {
            return None;
        }
        self.ring.back().map(|(_, v)| v)
    }

    /// Touches `key` and returns mutable access to its value.
    pub(crate) fn touch_get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.touch(key) {
            return None;
        }
        let id = self.ring.back_id()?;
        self.ring.value_mut(id)
    }

    pub(crate) fn slot_id<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).copied()
    }

    /// Zero-based position of `key` counted from the oldest entry. O(n).
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let target = self.slot_id(key)?;
        self.ring.iter().position(|(id, _, _)| id == target)
    }

    /// Verifies index/ring agreement and ring link consistency.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.ring.check_invariants()?;
        if self.index.len() != self.ring.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but ring holds {} entries",
                self.index.len(),
                self.ring.len()
            )));
        }
        for (key, &id) in &self.index {
            match self.ring.entry(id) {
                Some((stored, _)) if stored == key => {},
                Some(_) => return Err(InvariantError::new("index points at a different key")),
                None => return Err(InvariantError::new("index points at a freed slot")),
            }
        }
        Ok(())
    }
}

impl<K, V> SequencedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Inserts or updates `key`, linking it at the newest position.
    ///
    /// Returns the previous value when `key` was present. The revision
    /// increases by exactly one either way.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.bump_revision();

        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_set_update();

            self.ring.move_to_back(id);
            return self.ring.replace_value(id, value);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_set_new();

        let id = self.ring.push_back(key.clone(), value);
        self.index.insert(key, id);
        None
    }

    /// Alias for [`set`](Self::set).
    #[inline]
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        self.set(key, value)
    }

    /// Rehydration hook: rebuilds the key index from the ring.
    ///
    /// Call after the ring was populated from an external representation
    /// without going through [`set`](Self::set). Duplicate keys keep their
    /// newest occurrence; older ones are unlinked. Returns how many duplicates
    /// were dropped. Bumps the revision.
    pub fn rebuild_index(&mut self) -> usize {
        let ids: Vec<SlotId> = self.ring.iter().map(|(id, _, _)| id).collect();
        self.index.clear();
        self.index.reserve(ids.len());

        let mut dropped = 0;
        for id in ids {
            let Some((key, _)) = self.ring.entry(id) else {
                continue;
            };
            if let Some(older) = self.index.insert(key.clone(), id) {
                self.ring.remove(older);
                dropped += 1;
            }
        }
        self.bump_revision();
        dropped
    }

    /// Builds a map from entries already in sequence order.
    #[cfg(any(test, feature = "serde"))]
    pub(crate) fn from_ordered_entries(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let entries = entries.into_iter();
        let mut map = Self::with_capacity(entries.size_hint().0);
        for (key, value) in entries {
            map.ring.push_back(key, value);
        }
        map.rebuild_index();
        map
    }
}

#[cfg(feature = "metrics")]
impl<K, V> SequencedMap<K, V> {
    pub fn metrics_snapshot(&self) -> SequencedMapMetricsSnapshot {
        SequencedMapMetricsSnapshot {
            set_new: self.metrics.set_new,
            set_updates: self.metrics.set_updates,
            removes_found: self.metrics.removes_found,
            removes_missing: self.metrics.removes_missing,
            touches: self.metrics.touches,
            clears: self.metrics.clears,
            cursors_created: self.metrics.cursors_created.get(),
            cursor_invalidations: self.metrics.cursor_invalidations.get(),
            len: self.len(),
            revision: self.revision,
        }
    }

    pub fn reset_metrics(&mut self) {
        use crate::metrics::traits::MetricsReset;
        self.metrics.reset_metrics();
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<SequencedMapMetricsSnapshot> for SequencedMap<K, V> {
    fn snapshot(&self) -> SequencedMapMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> Default for SequencedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AsRef<SequencedMap<K, V>> for SequencedMap<K, V> {
    fn as_ref(&self) -> &SequencedMap<K, V> {
        self
    }
}

/// Clones entries, order and revision. The clone gets its own sync root.
impl<K, V> Clone for SequencedMap<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
            ring: self.ring.clone(),
            revision: self.revision,
            sync_root: Arc::new(Mutex::new(())),
            #[cfg(feature = "metrics")]
            metrics: SequencedMapMetrics::default(),
        }
    }
}

impl<K, V> fmt::Debug for SequencedMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Renders `[k1=v1,k2=v2]`, oldest first; an empty map renders `[]`.
impl<K, V> fmt::Display for SequencedMap<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("]")
    }
}

/// Two maps are equal when they hold equal entries in the same order.
impl<K, V> PartialEq for SequencedMap<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.ring.len() == other.ring.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for SequencedMap<K, V> {}

/// Panics if `key` is absent, like `HashMap`'s indexer.
impl<K, V, Q> Index<&Q> for SequencedMap<K, V>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not present in SequencedMap"),
        }
    }
}

impl<K, V> Extend<(K, V)> for SequencedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SequencedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a SequencedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator, oldest entry first.
pub struct IntoIter<K, V> {
    ring: SentinelRing<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.ring.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.ring.len(), Some(self.ring.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> IntoIterator for SequencedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { ring: self.ring }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Set(u8, u16),
        Remove(u8),
        Touch(u8),
        PopFirst,
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0u8..32, any::<u16>()).prop_map(|(k, v)| Op::Set(k, v)),
            2 => (0u8..32).prop_map(Op::Remove),
            2 => (0u8..32).prop_map(Op::Touch),
            1 => Just(Op::PopFirst),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        /// Property: the map agrees with a Vec-based reference model after every op
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut map = SequencedMap::new();
            let mut model: Vec<(u8, u16)> = Vec::new();

            for op in ops {
                let before = map.revision();
                match op {
                    Op::Set(k, v) => {
                        model.retain(|(mk, _)| *mk != k);
                        model.push((k, v));
                        map.set(k, v);
                        prop_assert_eq!(map.revision(), before + 1);
                    }
                    Op::Remove(k) => {
                        let existed = model.iter().any(|(mk, _)| *mk == k);
                        model.retain(|(mk, _)| *mk != k);
                        prop_assert_eq!(map.remove(&k).is_some(), existed);
                        prop_assert_eq!(map.revision(), before + u64::from(existed));
                    }
                    Op::Touch(k) => {
                        if let Some(pos) = model.iter().position(|(mk, _)| *mk == k) {
                            let entry = model.remove(pos);
                            model.push(entry);
                        }
                        map.touch(&k);
                    }
                    Op::PopFirst => {
                        let expected = if model.is_empty() { None } else { Some(model.remove(0)) };
                        prop_assert_eq!(map.pop_first(), expected);
                    }
                    Op::Clear => {
                        model.clear();
                        map.clear();
                        prop_assert_eq!(map.revision(), before + 1);
                    }
                }

                let actual: Vec<(u8, u16)> = map.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(&actual, &model);
                prop_assert!(map.check_invariants().is_ok());
            }
        }

        /// Property: every key set and not removed is found with its last value
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_round_trip_containment(pairs in prop::collection::vec((0u8..64, any::<u32>()), 0..100)) {
            let map: SequencedMap<u8, u32> = pairs.iter().copied().collect();
            for (k, _) in &pairs {
                let last = pairs.iter().rev().find(|(pk, _)| pk == k).map(|(_, v)| *v);
                prop_assert!(map.contains_key(k));
                prop_assert_eq!(map.get(k).copied(), last);
            }
        }
    }
}
