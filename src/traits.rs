//! # Cache Trait Hierarchy
//!
//! Policy-level traits implemented by the bounded map, so callers can write
//! code against "a cache" rather than a concrete container.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌─────────────────────────────────────────┐
//!                 │            CoreCache<K, V>              │
//!                 │                                         │
//!                 │  insert(&mut, K, V) → Option<V>         │
//!                 │  get(&mut, &K) → Option<&V>             │
//!                 │  contains(&, &K) → bool                 │
//!                 │  len(&) → usize                         │
//!                 │  is_empty(&) → bool                     │
//!                 │  capacity(&) → usize                    │
//!                 │  clear(&mut)                            │
//!                 └──────────────────┬──────────────────────┘
//!                                    │
//!                                    ▼
//!                 ┌─────────────────────────────────────────┐
//!                 │          MutableCache<K, V>             │
//!                 │  remove(&K) → Option<V>                 │
//!                 │  remove_batch(&[K])                     │
//!                 └──────────────────┬──────────────────────┘
//!                                    │
//!                                    ▼
//!                 ┌─────────────────────────────────────────┐
//!                 │          LruCacheTrait<K, V>            │
//!                 │  pop_lru() → (K, V)                     │
//!                 │  peek_lru() → (&K, &V)                  │
//!                 │  touch(&K) → bool                       │
//!                 │  recency_rank(&K) → usize               │
//!                 └─────────────────────────────────────────┘
//! ```
//!
//! The unbounded [`SequencedMap`](crate::map::SequencedMap) deliberately does
//! not implement these: it has no capacity and never evicts.
//!
//! ## Thread Safety
//!
//! None of the implementors lock internally. [`ConcurrentCache`] marks the
//! wrappers that do.

/// Operations every cache supports.
///
/// # Example
///
/// ```
/// use seqcache::traits::CoreCache;
/// use seqcache::policy::lru::LruMap;
///
/// fn warm_cache<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = LruMap::new(100);
/// warm_cache(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(CoreCache::len(&cache), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if it existed.
    ///
    /// If the cache is full, an entry may be evicted according to the cache's
    /// policy before the new entry is inserted.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key.
    ///
    /// May update eviction order. Use [`contains`](Self::contains) to check
    /// existence without side effects.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Current number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    fn capacity(&self) -> usize;

    /// Removes all entries.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
///
/// # Example
///
/// ```
/// use seqcache::traits::{CoreCache, MutableCache};
/// use seqcache::policy::lru::LruMap;
///
/// fn invalidate_keys<C: MutableCache<u64, String>>(cache: &mut C, keys: &[u64]) {
///     for key in keys {
///         cache.remove(key);
///     }
/// }
///
/// let mut cache = LruMap::new(100);
/// cache.insert(1, "one".to_string());
/// cache.insert(2, "two".to_string());
/// cache.insert(3, "three".to_string());
///
/// invalidate_keys(&mut cache, &[1, 3]);
/// assert!(!CoreCache::contains(&cache, &1));
/// assert!(CoreCache::contains(&cache, &2));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes multiple keys; results line up with the input order.
    ///
    /// ```
    /// use seqcache::traits::{CoreCache, MutableCache};
    /// use seqcache::policy::lru::LruMap;
    ///
    /// let mut cache = LruMap::new(10);
    /// cache.insert(1, "one");
    /// cache.insert(2, "two");
    /// cache.insert(3, "three");
    ///
    /// let removed = cache.remove_batch(&[1, 99, 3]);
    /// assert_eq!(removed, vec![Some("one"), None, Some("three")]);
    /// ```
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|k| self.remove(k)).collect()
    }
}

/// LRU-specific operations.
///
/// # Example
///
/// ```
/// use seqcache::traits::{CoreCache, LruCacheTrait};
/// use seqcache::policy::lru::LruMap;
///
/// let mut cache = LruMap::new(3);
/// cache.insert(1, "first");
/// cache.insert(2, "second");
/// cache.insert(3, "third");
///
/// // Access key 1 to make it most recent
/// CoreCache::get(&mut cache, &1);
///
/// // Key 2 is now least recent
/// assert_eq!(cache.peek_lru().map(|(k, _)| *k), Some(2));
///
/// // Touch without retrieving value
/// assert!(LruCacheTrait::touch(&mut cache, &2));
///
/// let (key, _) = LruCacheTrait::pop_lru(&mut cache).unwrap();
/// assert_eq!(key, 3);
/// ```
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Peeks at the least recently used entry without touching it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks an entry as recently used without retrieving the value.
    ///
    /// Returns `true` if the key was found.
    fn touch(&mut self, key: &K) -> bool;

    /// Recency rank of a key: 0 is the most recent.
    ///
    /// ```
    /// use seqcache::traits::{CoreCache, LruCacheTrait};
    /// use seqcache::policy::lru::LruMap;
    ///
    /// let mut cache = LruMap::new(10);
    /// cache.insert(1, "first");
    /// cache.insert(2, "second");
    /// cache.insert(3, "third");
    ///
    /// assert_eq!(LruCacheTrait::recency_rank(&cache, &3), Some(0));
    /// assert_eq!(LruCacheTrait::recency_rank(&cache, &1), Some(2));
    /// assert_eq!(LruCacheTrait::recency_rank(&cache, &99), None);
    /// ```
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Marker for cache types that are safe to share across threads.
///
/// The plain maps are not; wrap them or use
/// `ConcurrentLruMap` (feature `concurrency`).
pub trait ConcurrentCache: Send + Sync {}
