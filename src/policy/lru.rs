//! # Least Recently Used (LRU) Map
//!
//! A bounded map built by composition over [`SequencedMap`]: the ordered map
//! already keeps entries in write order, so LRU only has to treat reads as
//! writes (touch on `get`) and evict from the oldest end when full.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                     ConcurrentLruMap<K, V>                           │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                 Arc<RwLock<LruMap<K, V>>>                    │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                                │                                     │
//!   │                                ▼                                     │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                      LruMap<K, V>                            │   │
//!   │   │                                                              │   │
//!   │   │   maximum_size: usize                                        │   │
//!   │   │                                                              │   │
//!   │   │   map: SequencedMap<K, V>                                    │   │
//!   │   │     [sentinel] ◄──► [A] ◄──► [B] ◄──► [C] ◄──► [sentinel]    │   │
//!   │   │                     LRU                MRU                   │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   set(D) with maximum_size = 3, D absent
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   Before:   [A] ◄──► [B] ◄──► [C]
//!             LRU               MRU
//!
//!   1. len() >= maximum_size and D is new: evict [A] (oldest)
//!   2. Upsert D at the newest end
//!
//!   After:    [B] ◄──► [C] ◄──► [D]
//!
//!   get(B)
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   Before:   [B] ◄──► [C] ◄──► [D]
//!   After:    [C] ◄──► [D] ◄──► [B]      (touch: relinked at MRU end)
//! ```
//!
//! ## Key Components
//!
//! | Component             | Description                                       |
//! |-----------------------|---------------------------------------------------|
//! | `LruMap<K, V>`        | Single-threaded bounded map                       |
//! | `ConcurrentLruMap`    | Thread-safe wrapper with `parking_lot::RwLock`    |
//!
//! ## Complexity
//!
//! | Operation           | Time   | Notes                                  |
//! |---------------------|--------|----------------------------------------|
//! | `get` / `get_mut`   | O(1)   | Touches the entry                      |
//! | `peek`              | O(1)   | No reordering                          |
//! | `set`               | O(1)   | May evict one entry                    |
//! | `remove`            | O(1)   |                                        |
//! | `set_maximum_size`  | O(k)   | k = entries evicted by a shrink        |
//! | `recency_rank`      | O(r)   | r = rank; walks from the MRU end       |
//!
//! ## Capacity
//!
//! `len() <= maximum_size()` holds after every call returns. A maximum size of
//! zero produces a map that rejects every insert.
//!
//! ## Thread Safety
//!
//! - `LruMap`: **not** internally synchronized; see
//!   [`sync_root`](LruMap::sync_root) for caller-managed locking
//! - `ConcurrentLruMap`: **thread-safe** via `parking_lot::RwLock`

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

#[cfg(feature = "concurrency")]
use parking_lot::RwLock;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

use crate::error::InvariantError;
use crate::map::cursor::{EntryCursor, Iter, KeyCursor, Keys, ValueCursor, Values};
use crate::map::sequenced::{SequencedMap, SyncRoot};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMapMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMapMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LruMetricsReadRecorder, LruMetricsRecorder, MetricsReset,
    MetricsSnapshotProvider,
};
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

/// Maximum size used by [`LruMap::default`].
pub const DEFAULT_MAXIMUM_SIZE: usize = 100;

/// Upper bound on the up-front allocation made by [`LruMap::new`].
const MAX_PREALLOCATION: usize = 1024;

/// Bounded map with least-recently-used eviction.
///
/// # Example
///
/// ```
/// use seqcache::policy::lru::LruMap;
///
/// let mut cache = LruMap::new(2);
/// cache.set("a", 1);
/// cache.set("b", 2);
///
/// // Reading "a" makes it the most recent
/// assert_eq!(cache.get(&"a"), Some(&1));
///
/// // "b" is now the oldest and gets evicted
/// cache.set("c", 3);
/// assert!(!cache.contains_key(&"b"));
/// assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["a", "c"]);
/// ```
pub struct LruMap<K, V> {
    map: SequencedMap<K, V>,
    maximum_size: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMapMetrics,
}

impl<K, V> LruMap<K, V> {
    /// Creates an empty map that holds at most `maximum_size` entries.
    ///
    /// A maximum size of 0 creates a map that accepts no entries.
    pub fn new(maximum_size: usize) -> Self {
        Self::with_capacity(maximum_size, maximum_size.min(MAX_PREALLOCATION))
    }

    /// Creates an empty map with an explicit pre-allocation hint.
    pub fn with_capacity(maximum_size: usize, initial_capacity: usize) -> Self {
        Self {
            map: SequencedMap::with_capacity(initial_capacity.min(maximum_size)),
            maximum_size,
            #[cfg(feature = "metrics")]
            metrics: LruMapMetrics::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn maximum_size(&self) -> usize {
        self.maximum_size
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.map.revision()
    }

    pub fn sync_root(&self) -> SyncRoot {
        self.map.sync_root()
    }

    /// Always `false`. Use [`ConcurrentLruMap`] for a locked variant.
    #[inline]
    pub fn is_synchronized(&self) -> bool {
        false
    }

    /// Read-only view of the underlying ordered map.
    pub fn as_sequenced(&self) -> &SequencedMap<K, V> {
        &self.map
    }

    /// Least recently used entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.map.first()
    }

    /// Most recently used entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.map.last()
    }

    pub fn first_key(&self) -> Option<&K> {
        self.map.first_key()
    }

    pub fn first_value(&self) -> Option<&V> {
        self.map.first_value()
    }

    pub fn last_key(&self) -> Option<&K> {
        self.map.last_key()
    }

    pub fn last_value(&self) -> Option<&V> {
        self.map.last_value()
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Keys<'_, K, V> {
        self.map.keys()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        self.map.values()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.map.iter()
    }

    /// Detached fail-fast cursor; advance it with `cursor.next(&lru)`.
    pub fn cursor(&self) -> EntryCursor {
        self.map.cursor()
    }

    pub fn key_cursor(&self) -> KeyCursor {
        self.map.key_cursor()
    }

    pub fn value_cursor(&self) -> ValueCursor {
        self.map.value_cursor()
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.map.clear();
    }

    /// Changes the bound. Shrinking evicts oldest entries until the map fits;
    /// growing never evicts.
    pub fn set_maximum_size(&mut self, maximum_size: usize)
    where
        K: Eq + Hash,
    {
        let previous = self.maximum_size;
        self.maximum_size = maximum_size;
        if maximum_size >= previous {
            return;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_capacity_shrink();

        let evicted = self.evict_to_fit(maximum_size);
        tracing::debug!(
            previous,
            maximum_size,
            evicted,
            len = self.map.len(),
            "lru map maximum size reduced"
        );
    }

    /// Evicts from the LRU end until `len() <= limit`; returns the count.
    fn evict_to_fit(&mut self, limit: usize) -> usize
    where
        K: Eq + Hash,
    {
        let mut evicted = 0;
        while self.map.len() > limit {
            if self.evict_oldest().is_none() {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    fn evict_oldest(&mut self) -> Option<(K, V)>
    where
        K: Eq + Hash,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        let evicted = self.map.pop_first()?;
        tracing::trace!(
            len = self.map.len(),
            maximum_size = self.maximum_size,
            "evicted least recently used entry"
        );

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();

        Some(evicted)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)>
    where
        K: Eq + Hash,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_call();

        let entry = self.map.pop_first()?;

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_found();

        Some(entry)
    }

    /// Alias for [`pop_lru`](Self::pop_lru).
    #[inline]
    pub fn pop_first(&mut self) -> Option<(K, V)>
    where
        K: Eq + Hash,
    {
        self.pop_lru()
    }

    /// Verifies the ordered map and the size bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        K: Eq + Hash,
    {
        self.map.check_invariants()?;
        if self.map.len() > self.maximum_size {
            return Err(InvariantError::new(format!(
                "lru map holds {} entries, above maximum size {}",
                self.map.len(),
                self.maximum_size
            )));
        }
        Ok(())
    }
}

impl<K, V> LruMap<K, V>
where
    K: Eq + Hash,
{
    /// Looks up `key` and marks it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.record_lookup(self.map.contains_key(key));

        self.map.touch_get(key)
    }

    /// Mutable lookup; marks `key` most recently used.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.record_lookup(self.map.contains_key(key));

        self.map.touch_get_mut(key)
    }

    /// Looks up `key` without changing recency.
    ///
    /// ```
    /// use seqcache::policy::lru::LruMap;
    ///
    /// let mut cache = LruMap::new(2);
    /// cache.set(1, "first");
    /// cache.set(2, "second");
    ///
    /// assert_eq!(cache.peek(&1), Some(&"first"));
    ///
    /// // Key 1 is still the oldest and is evicted first
    /// cache.set(3, "third");
    /// assert!(!cache.contains_key(&1));
    /// ```
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_call();

        let value = self.map.get(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_peek_hit();

        Some(value)
    }

    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove(key)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove_entry(key)
    }

    /// Marks `key` most recently used without reading it.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.map.touch(key);

        #[cfg(feature = "metrics")]
        self.record_touch(found);

        found
    }

    /// Recency rank of `key`: 0 is the most recently used.
    pub fn recency_rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_recency_rank_call();

        let target = self.map.slot_id(key)?;
        let ring = self.map.ring();
        let mut rank = 0usize;
        let mut current = ring.back_id();

        while let Some(id) = current {
            #[cfg(feature = "metrics")]
            self.metrics.record_recency_rank_scan_step();

            if id == target {
                #[cfg(feature = "metrics")]
                self.metrics.record_recency_rank_found();
                return Some(rank);
            }
            rank += 1;
            current = ring.prev_id(id).filter(|&prev| prev != ring.sentinel());
        }
        None
    }
}

impl<K, V> LruMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Inserts or updates `key` as the most recently used entry.
    ///
    /// When the map is full and `key` is new, the least recently used entry
    /// is evicted first. Updating a present key never evicts. With a maximum
    /// size of 0 the value is dropped and `None` returned.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.map.contains_key(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            return self.map.set(key, value);
        }

        if self.maximum_size == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();

            tracing::trace!("lru map with zero maximum size rejected insert");
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.map.len() >= self.maximum_size {
            self.evict_to_fit(self.maximum_size - 1);
        }

        self.map.set(key, value)
    }

    /// Alias for [`set`](Self::set).
    #[inline]
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        self.set(key, value)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruMap<K, V> {
    pub fn metrics_snapshot(&self) -> LruMapMetricsSnapshot {
        LruMapMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            insert_rejected: self.metrics.insert_rejected,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            capacity_shrinks: self.metrics.capacity_shrinks,
            clears: self.metrics.clears,
            pop_lru_calls: self.metrics.pop_lru_calls,
            pop_lru_found: self.metrics.pop_lru_found,
            touch_calls: self.metrics.touch_calls,
            touch_found: self.metrics.touch_found,
            peek_calls: self.metrics.peek_calls.get(),
            peek_hits: self.metrics.peek_hits.get(),
            recency_rank_calls: self.metrics.recency_rank_calls.get(),
            recency_rank_found: self.metrics.recency_rank_found.get(),
            recency_rank_scan_steps: self.metrics.recency_rank_scan_steps.get(),
            map: self.map.metrics_snapshot(),
            maximum_size: self.maximum_size,
        }
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset_metrics();
        self.map.reset_metrics();
    }

    fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.metrics.record_get_hit();
        } else {
            self.metrics.record_get_miss();
        }
    }

    fn record_touch(&mut self, found: bool) {
        self.metrics.record_touch_call();
        if found {
            self.metrics.record_touch_found();
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMapMetricsSnapshot> for LruMap<K, V> {
    fn snapshot(&self) -> LruMapMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> CoreCache<K, V> for LruMap<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.set(key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        LruMap::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.maximum_size
    }

    fn clear(&mut self) {
        LruMap::clear(self);
    }
}

impl<K, V> MutableCache<K, V> for LruMap<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }
}

impl<K, V> LruCacheTrait<K, V> for LruMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        LruMap::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        self.map.first()
    }

    fn touch(&mut self, key: &K) -> bool {
        LruMap::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        LruMap::recency_rank(self, key)
    }
}

impl<K, V> AsRef<SequencedMap<K, V>> for LruMap<K, V> {
    fn as_ref(&self) -> &SequencedMap<K, V> {
        &self.map
    }
}

impl<K, V> Default for LruMap<K, V> {
    /// Creates an LRU map with a maximum size of 100.
    fn default() -> Self {
        Self::new(DEFAULT_MAXIMUM_SIZE)
    }
}

impl<K, V> Clone for LruMap<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
            maximum_size: self.maximum_size,
            #[cfg(feature = "metrics")]
            metrics: LruMapMetrics::default(),
        }
    }
}

impl<K, V> fmt::Debug for LruMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruMap")
            .field("maximum_size", &self.maximum_size)
            .field("entries", &self.map)
            .finish()
    }
}

/// Same rendering as [`SequencedMap`], least recently used first.
impl<K, V> fmt::Display for LruMap<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.map, f)
    }
}

impl<K, V> Extend<(K, V)> for LruMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a LruMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::hash::Hash;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::LruMap;
    use crate::map::sequenced::SequencedMap;

    #[derive(Serialize)]
    struct LruMapRef<'a, K, V> {
        maximum_size: usize,
        entries: &'a SequencedMap<K, V>,
    }

    #[derive(Deserialize)]
    #[serde(bound(deserialize = "K: Deserialize<'de> + Eq + Hash + Clone, V: Deserialize<'de>"))]
    struct LruMapOwned<K, V> {
        maximum_size: usize,
        entries: SequencedMap<K, V>,
    }

    impl<K, V> Serialize for LruMap<K, V>
    where
        K: Serialize,
        V: Serialize,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            LruMapRef {
                maximum_size: self.maximum_size,
                entries: &self.map,
            }
            .serialize(serializer)
        }
    }

    /// Entries beyond `maximum_size` are dropped from the LRU end.
    impl<'de, K, V> Deserialize<'de> for LruMap<K, V>
    where
        K: Deserialize<'de> + Eq + Hash + Clone,
        V: Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let owned = LruMapOwned::<K, V>::deserialize(deserializer)?;
            let mut lru = LruMap::with_capacity(owned.maximum_size, 0);
            lru.map = owned.entries;
            lru.evict_to_fit(owned.maximum_size);
            Ok(lru)
        }
    }
}

/// Thread-safe LRU map wrapper using `RwLock`.
///
/// Lookups that touch (`get`) take the write lock; `peek`, `contains_key` and
/// `len` share the read lock. Values are returned by clone.
#[cfg(feature = "concurrency")]
pub struct ConcurrentLruMap<K, V> {
    inner: Arc<RwLock<LruMap<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> Clone for ConcurrentLruMap<K, V> {
    /// Clones the handle; both handles share one map.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLruMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.inner.read();
        f.debug_struct("ConcurrentLruMap")
            .field("len", &map.len())
            .field("maximum_size", &map.maximum_size())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> Default for ConcurrentLruMap<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAXIMUM_SIZE)
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> From<LruMap<K, V>> for ConcurrentLruMap<K, V> {
    fn from(map: LruMap<K, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLruMap<K, V> {
    /// Creates a new thread-safe LRU map.
    ///
    /// ```
    /// use seqcache::policy::lru::ConcurrentLruMap;
    ///
    /// let cache: ConcurrentLruMap<u32, String> = ConcurrentLruMap::new(100);
    /// assert_eq!(cache.maximum_size(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(maximum_size: usize) -> Self {
        LruMap::new(maximum_size).into()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn maximum_size(&self) -> usize {
        self.inner.read().maximum_size()
    }

    pub fn set_maximum_size(&self, maximum_size: usize)
    where
        K: Eq + Hash,
    {
        self.inner.write().set_maximum_size(maximum_size);
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&self) -> Option<(K, V)>
    where
        K: Eq + Hash,
    {
        self.inner.write().pop_lru()
    }

    /// Runs `f` under the read lock.
    ///
    /// ```
    /// use seqcache::policy::lru::ConcurrentLruMap;
    ///
    /// let cache = ConcurrentLruMap::new(4);
    /// cache.set("a", 1);
    /// cache.set("b", 2);
    /// let keys: Vec<_> = cache.read(|map| map.keys().copied().collect());
    /// assert_eq!(keys, vec!["a", "b"]);
    /// ```
    pub fn read<R>(&self, f: impl FnOnce(&LruMap<K, V>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` under the write lock, for compound updates.
    pub fn write<R>(&self, f: impl FnOnce(&mut LruMap<K, V>) -> R) -> R {
        f(&mut self.inner.write())
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLruMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Inserts or updates; returns the previous value.
    ///
    /// ```
    /// use seqcache::policy::lru::ConcurrentLruMap;
    ///
    /// let cache: ConcurrentLruMap<u32, String> = ConcurrentLruMap::new(100);
    /// assert!(cache.set(1, "first".to_string()).is_none());
    /// assert_eq!(cache.set(1, "updated".to_string()).as_deref(), Some("first"));
    /// ```
    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.inner.write().set(key, value)
    }

    /// Gets a clone of the value and marks it most recently used.
    ///
    /// Takes the write lock because it reorders.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.write().get(key).cloned()
    }

    /// Gets a clone of the value without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.read().peek(key).cloned()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove(key)
    }

    pub fn touch<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().touch(key)
    }

    /// Clones the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(K, V)>
    where
        V: Clone,
    {
        self.inner
            .read()
            .first()
            .map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Clones every entry, least recently used first.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.inner
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(all(feature = "metrics", feature = "concurrency"))]
impl<K, V> ConcurrentLruMap<K, V> {
    pub fn metrics_snapshot(&self) -> LruMapMetricsSnapshot {
        self.inner.read().metrics_snapshot()
    }
}

#[cfg(all(feature = "metrics", feature = "concurrency"))]
impl<K, V> MetricsSnapshotProvider<LruMapMetricsSnapshot> for ConcurrentLruMap<K, V> {
    fn snapshot(&self) -> LruMapMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentCache for ConcurrentLruMap<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    mod correctness {
        use super::*;

        mod basic_behavior {
            use super::*;

            #[test]
            fn test_new_map_creation() {
                let m0: LruMap<i32, i32> = LruMap::new(0);
                assert_eq!(m0.maximum_size(), 0);
                assert!(m0.is_empty());

                let m10: LruMap<i32, i32> = LruMap::new(10);
                assert_eq!(m10.maximum_size(), 10);

                let d: LruMap<i32, i32> = LruMap::default();
                assert_eq!(d.maximum_size(), DEFAULT_MAXIMUM_SIZE);
            }

            #[test]
            fn test_huge_maximum_size_does_not_preallocate() {
                let mut m: LruMap<u64, u64> = LruMap::new(usize::MAX);
                m.set(1, 1);
                assert_eq!(m.len(), 1);
            }

            #[test]
            fn test_set_and_get() {
                let mut m = LruMap::new(5);
                assert_eq!(m.set(1, 100), None);
                assert_eq!(m.get(&1), Some(&100));
                assert_eq!(m.get(&2), None);
                assert_eq!(m.len(), 1);
            }

            #[test]
            fn test_set_existing_returns_previous() {
                let mut m = LruMap::new(5);
                m.set(1, 100);
                assert_eq!(m.set(1, 200), Some(100));
                assert_eq!(m.len(), 1);
                assert_eq!(m.peek(&1), Some(&200));
            }

            #[test]
            fn test_remove() {
                let mut m = LruMap::new(5);
                m.set(1, 100);
                assert_eq!(m.remove(&1), Some(100));
                assert_eq!(m.remove(&1), None);
                assert!(m.is_empty());
            }

            #[test]
            fn test_display() {
                let mut m = LruMap::new(3);
                m.set("x", 1);
                m.set("y", 2);
                assert_eq!(m.to_string(), "[x=1,y=2]");
            }
        }

        mod lru_operations {
            use super::*;

            #[test]
            fn test_touch_on_read_protects_from_eviction() {
                let mut m = LruMap::new(2);
                m.set("A", 1);
                m.set("B", 2);
                m.get(&"A");
                m.set("C", 3);
                assert!(m.contains_key(&"A"));
                assert!(!m.contains_key(&"B"));
                assert!(m.contains_key(&"C"));
                assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec!["A", "C"]);
            }

            #[test]
            fn test_peek_leaves_entry_exposed_to_eviction() {
                let mut m = LruMap::new(2);
                m.set("a", 1);
                m.set("b", 2);
                assert_eq!(m.peek(&"a"), Some(&1));
                m.set("c", 3);
                assert!(!m.contains_key(&"a"));
                assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec!["b", "c"]);
            }

            #[test]
            fn test_shrink_with_owned_keys() {
                let mut m = LruMap::new(4);
                for name in ["w", "x", "y", "z"] {
                    m.set(name.to_string(), name.len());
                }
                m.get("w");
                m.set_maximum_size(2);
                assert_eq!(m.len(), 2);
                assert_eq!(
                    m.keys().cloned().collect::<Vec<_>>(),
                    vec!["z".to_string(), "w".to_string()]
                );
                assert_eq!(m.pop_first(), Some(("z".to_string(), 1)));
                m.check_invariants().unwrap();
            }

            #[test]
            fn test_get_missing_keeps_order_and_revision() {
                let mut m = LruMap::new(3);
                m.set(1, 1);
                m.set(2, 2);
                let rev = m.revision();
                assert_eq!(m.get(&9), None);
                assert_eq!(m.revision(), rev);
                assert_eq!(m.first_key(), Some(&1));
            }

            #[test]
            fn test_get_hit_bumps_revision() {
                let mut m = LruMap::new(3);
                m.set(1, 1);
                let rev = m.revision();
                m.get(&1);
                assert_eq!(m.revision(), rev + 1);
            }

            #[test]
            fn test_peek_does_not_touch() {
                let mut m = LruMap::new(2);
                m.set(1, "a");
                m.set(2, "b");
                let rev = m.revision();
                assert_eq!(m.peek(&1), Some(&"a"));
                assert_eq!(m.revision(), rev);
                m.set(3, "c");
                assert!(!m.contains_key(&1));
            }

            #[test]
            fn test_update_at_capacity_never_evicts() {
                let mut m = LruMap::new(2);
                m.set(1, 1);
                m.set(2, 2);
                m.set(1, 10);
                assert_eq!(m.len(), 2);
                assert!(m.contains_key(&2));
                assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![2, 1]);
            }

            #[test]
            fn test_get_mut_touches() {
                let mut m = LruMap::new(2);
                m.set(1, 1);
                m.set(2, 2);
                if let Some(v) = m.get_mut(&1) {
                    *v = 100;
                }
                m.set(3, 3);
                assert_eq!(m.peek(&1), Some(&100));
                assert!(!m.contains_key(&2));
            }

            #[test]
            fn test_pop_lru_order() {
                let mut m = LruMap::new(3);
                m.set(1, "a");
                m.set(2, "b");
                m.set(3, "c");
                m.touch(&1);
                assert_eq!(m.pop_lru(), Some((2, "b")));
                assert_eq!(m.pop_first(), Some((3, "c")));
                assert_eq!(m.pop_lru(), Some((1, "a")));
                assert_eq!(m.pop_lru(), None);
            }

            #[test]
            fn test_touch_missing_returns_false() {
                let mut m: LruMap<i32, i32> = LruMap::new(3);
                assert!(!m.touch(&1));
            }

            #[test]
            fn test_recency_rank() {
                let mut m = LruMap::new(4);
                m.set(1, ());
                m.set(2, ());
                m.set(3, ());
                assert_eq!(m.recency_rank(&3), Some(0));
                assert_eq!(m.recency_rank(&2), Some(1));
                assert_eq!(m.recency_rank(&1), Some(2));
                m.get(&1);
                assert_eq!(m.recency_rank(&1), Some(0));
                assert_eq!(m.recency_rank(&3), Some(1));
                assert_eq!(m.recency_rank(&99), None);
            }

            #[test]
            fn test_trait_surface() {
                let mut m = LruMap::new(2);
                CoreCache::insert(&mut m, 1, "a");
                CoreCache::insert(&mut m, 2, "b");
                assert_eq!(CoreCache::capacity(&m), 2);
                assert_eq!(m.peek_lru(), Some((&1, &"a")));
                assert_eq!(CoreCache::get(&mut m, &1), Some(&"a"));
                assert_eq!(m.peek_lru(), Some((&2, &"b")));
                assert_eq!(MutableCache::remove(&mut m, &2), Some("b"));
                CoreCache::clear(&mut m);
                assert!(CoreCache::is_empty(&m));
            }
        }

        mod edge_cases {
            use super::*;

            #[test]
            fn test_zero_maximum_size_rejects_inserts() {
                let mut m = LruMap::new(0);
                assert_eq!(m.set(1, 1), None);
                assert_eq!(m.set(1, 2), None);
                assert!(m.is_empty());
                assert_eq!(m.get(&1), None);
                m.check_invariants().unwrap();
            }

            #[test]
            fn test_maximum_size_one() {
                let mut m = LruMap::new(1);
                m.set(1, 1);
                m.set(2, 2);
                assert_eq!(m.len(), 1);
                assert_eq!(m.first_key(), Some(&2));
            }

            #[test]
            fn test_shrink_keeps_newest_in_order() {
                let mut m = LruMap::new(5);
                for i in 1..=5 {
                    m.set(i, i * 10);
                }
                m.set_maximum_size(2);
                assert_eq!(m.maximum_size(), 2);
                assert_eq!(m.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), vec![
                    (4, 40),
                    (5, 50)
                ]);
                m.check_invariants().unwrap();
            }

            #[test]
            fn test_grow_never_evicts() {
                let mut m = LruMap::new(2);
                m.set(1, 1);
                m.set(2, 2);
                m.set_maximum_size(10);
                assert_eq!(m.len(), 2);
                for i in 3..=10 {
                    m.set(i, i);
                }
                assert_eq!(m.len(), 10);
            }

            #[test]
            fn test_shrink_to_zero_empties() {
                let mut m = LruMap::new(3);
                m.extend([(1, 1), (2, 2), (3, 3)]);
                m.set_maximum_size(0);
                assert!(m.is_empty());
                assert_eq!(m.set(4, 4), None);
                assert!(m.is_empty());
            }

            #[test]
            fn test_extend_respects_bound() {
                let mut m = LruMap::new(3);
                m.extend((0..10).map(|i| (i, i)));
                assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![7, 8, 9]);
            }

            #[test]
            fn test_clear_then_reuse() {
                let mut m = LruMap::new(2);
                m.set(1, 1);
                m.clear();
                assert!(m.is_empty());
                m.set(2, 2);
                m.set(3, 3);
                m.set(4, 4);
                assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![3, 4]);
            }

            #[test]
            fn test_cursor_through_lru_map() {
                let mut m = LruMap::new(3);
                m.set(1, "a");
                m.set(2, "b");
                let mut cursor = m.key_cursor();
                assert_eq!(cursor.next(&m), Ok(Some(&1)));
                m.get(&1);
                assert!(cursor.next(&m).is_err());
            }

            #[test]
            fn test_borrowed_string_keys() {
                let mut m: LruMap<String, u32> = LruMap::new(2);
                m.set("one".to_string(), 1);
                assert_eq!(m.get("one"), Some(&1));
                assert_eq!(m.recency_rank("one"), Some(0));
                assert!(m.touch("one"));
                assert_eq!(m.remove("one"), Some(1));
            }
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn test_counters_track_operations() {
            let mut m = LruMap::new(2);
            m.set(1, 1);
            m.set(2, 2);
            m.get(&1);
            m.get(&9);
            m.set(3, 3);
            m.peek(&3);
            m.set_maximum_size(1);

            let snap = m.metrics_snapshot();
            assert_eq!(snap.insert_calls, 3);
            assert_eq!(snap.insert_new, 3);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 1);
            assert_eq!(snap.evicted_entries, 2);
            assert_eq!(snap.capacity_shrinks, 1);
            assert_eq!(snap.peek_calls, 1);
            assert_eq!(snap.peek_hits, 1);
            assert_eq!(snap.maximum_size, 1);
            assert_eq!(snap.map.len, 1);

            m.reset_metrics();
            assert_eq!(m.metrics_snapshot().insert_calls, 0);
        }

        #[test]
        fn test_zero_capacity_counts_rejections() {
            let mut m = LruMap::new(0);
            m.set(1, 1);
            assert_eq!(m.metrics_snapshot().insert_rejected, 1);
        }
    }

    #[cfg(feature = "concurrency")]
    mod concurrency {
        use super::*;

        #[test]
        fn test_shared_handle_sees_writes() {
            let a = ConcurrentLruMap::new(2);
            let b = a.clone();
            a.set(1, "one".to_string());
            assert_eq!(b.get(&1).as_deref(), Some("one"));
            b.set(2, "two".to_string());
            b.set(3, "three".to_string());
            assert_eq!(a.len(), 2);
            assert!(!a.contains_key(&1));
            assert!(a.contains_key(&2));
            assert_eq!(a.peek_lru(), Some((2, "two".to_string())));
        }
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: len never exceeds maximum_size across random workloads
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_len_within_bound(
            maximum_size in 0usize..16,
            ops in prop::collection::vec((0u8..3, 0u16..64), 0..300)
        ) {
            let mut m = LruMap::new(maximum_size);
            for (op, key) in ops {
                match op {
                    0 => { m.set(key, key); }
                    1 => { m.get(&key); }
                    _ => { m.remove(&key); }
                }
                prop_assert!(m.len() <= maximum_size);
                prop_assert!(m.check_invariants().is_ok());
            }
        }

        /// Property: eviction removes exactly the oldest entry
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_eviction_is_strict_lru(
            maximum_size in 1usize..8,
            keys in prop::collection::vec(0u16..32, 1..100)
        ) {
            let mut m = LruMap::new(maximum_size);
            for key in keys {
                let full_and_new = m.len() == maximum_size && !m.contains_key(&key);
                let oldest = m.first_key().copied();
                m.set(key, ());
                if full_and_new {
                    let oldest = oldest.unwrap();
                    prop_assert!(!m.contains_key(&oldest));
                }
                prop_assert_eq!(m.last_key(), Some(&key));
            }
        }
    }
}
